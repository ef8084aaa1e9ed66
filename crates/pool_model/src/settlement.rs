//! Withdrawal settlement math: proportional quotes, the dev-share split, and
//! the liquidity-capped withdrawal bound.

use crate::math::{div_floor, mul_div_floor, mul_u64, narrow};
use crate::state::PoolError;

/// Amounts a settlement will retire, computed before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalQuote {
    /// Units the unit engine will be asked to burn (the engine may add its
    /// one-unit rounding buffer on top for partial burns)
    pub units_to_burn: u64,
    /// Principal retired alongside the burn
    pub principal_to_retire: u64,
}

/// Quote a partial withdrawal of `amount` against a depositor holding
/// `held` units and `principal` principal, whose full claim is currently
/// worth `total_balance`.
///
/// The bound is strict: requesting the exact full balance through the
/// partial path fails with `InsufficientBalance`. A full exit must take the
/// full-withdrawal path, which burns without proportionality math.
///
/// Principal is retired pro rata to the units burned, not to the requested
/// amount, so the depositor's principal/interest split ratio is preserved.
pub fn quote_partial(
    held: u64,
    principal: u64,
    amount: u64,
    total_balance: u64,
) -> Result<WithdrawalQuote, PoolError> {
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if amount >= total_balance {
        return Err(PoolError::InsufficientBalance);
    }
    let units_to_burn = mul_div_floor(amount, held, total_balance)?;
    let principal_to_retire = mul_div_floor(units_to_burn, principal, held)?;
    Ok(WithdrawalQuote {
        units_to_burn,
        principal_to_retire,
    })
}

/// Quote a full exit: all units, all principal, no proportionality math.
pub fn quote_full(held: u64, principal: u64) -> WithdrawalQuote {
    WithdrawalQuote {
        units_to_burn: held,
        principal_to_retire: principal,
    }
}

/// Protocol share of the interest component of a payout.
///
/// Zero for internal-bridge depositors and whenever the payout carries no
/// interest over the retired principal. The `+1` compensates for the floor
/// in the payout computation so the dev-share base is never understated by
/// truncation. Result is capped at `payout`.
pub fn dev_share(
    payout: u64,
    principal_to_retire: u64,
    depositor_share_percent: u8,
    internal_bridge: bool,
) -> u64 {
    if internal_bridge {
        return 0;
    }
    let base = payout as u128 + 1;
    if base <= principal_to_retire as u128 {
        return 0;
    }
    let interest = base - principal_to_retire as u128;
    let protocol_percent = (100 - depositor_share_percent.min(100)) as u128;
    let share = interest * protocol_percent / 100;
    share.min(payout as u128) as u64
}

/// Depositor's claim net of the dev share: principal comes back in full,
/// interest is apportioned by `depositor_share_percent`. Uses the same
/// split function as settlement so the quoted balance and the settled
/// payout never disagree.
pub fn net_balance(
    gross_claim: u64,
    principal: u64,
    depositor_share_percent: u8,
    internal_bridge: bool,
) -> u64 {
    gross_claim - dev_share(gross_claim, principal, depositor_share_percent, internal_bridge)
}

/// Cap a depositor's withdrawable balance by the liquidity actually sitting
/// at the master pool.
///
/// Three regimes:
/// - liquidity covers the full scaled claim: the whole `total_balance`;
/// - liquidity does not even cover bare principal: the raw liquidity;
/// - in between: a liquidity-weighted interpolation
///   `available * total_units * total_balance / (principal * pool_value)`,
///   approximating the liquid fraction of the claim without re-simulating
///   settlement. Computed as two floor divisions to stay inside u128.
///
/// `principal == 0` with units outstanding cannot arise from correct
/// operation; it degrades to `min(total_balance, available)` rather than
/// dividing by zero.
pub fn max_withdrawal(
    gross_claim: u64,
    total_balance: u64,
    principal: u64,
    total_units: u64,
    pool_value: u64,
    available: u64,
) -> u64 {
    if available >= gross_claim {
        return total_balance;
    }
    if available < principal {
        return available;
    }
    if principal == 0 || pool_value == 0 {
        return total_balance.min(available);
    }
    // floor(available * total_units / pool_value): the liquid claim in units
    let liquid_units = match div_floor(mul_u64(available, total_units), pool_value) {
        Ok(v) => v,
        Err(_) => return 0,
    };
    let weighted = liquid_units * (total_balance as u128) / (principal as u128);
    match narrow(weighted) {
        Ok(v) => v.min(total_balance),
        Err(_) => total_balance,
    }
}
