//! Unit accounting engine: conversion between asset amounts and interest
//! units, and the paired mint/burn state updates.
//!
//! Rounding policy: every conversion rounds in the pool's favor. Mints round
//! the unit count down, redemptions round the asset amount down, and partial
//! burns destroy one extra unit as a rounding buffer. Together these make a
//! deposit/withdraw round trip at constant pool value pay out at most the
//! amount deposited.

use crate::math::mul_div_floor;
use crate::state::{DepositorAccount, PoolError, PoolLedger};

/// Units minted for a deposit of `amount` against the current pool value.
///
/// First deposit ever (no units outstanding) bootstraps 1:1. Afterwards
/// `floor(amount * total_units / pool_value)`, so a depositor never receives
/// more claim than the deposit is worth.
///
/// `pool_value` must be queried fresh, after the reward-accrual checkpoint
/// and before the deposited funds are counted.
pub fn units_for_deposit(amount: u64, pool_value: u64, total_units: u64) -> Result<u64, PoolError> {
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if total_units == 0 {
        return Ok(amount);
    }
    mul_div_floor(amount, total_units, pool_value)
}

/// Units actually destroyed for a burn request.
///
/// A request that drains either scope exactly (`requested == total_units` or
/// `requested == held`) burns exactly `requested`. Any other request burns
/// `requested + 1`: the extra unit is donated back to the pool so a partial
/// redemption never leaves the remaining unit value inflated relative to the
/// asset paid out.
pub fn burn_for_request(requested: u64, held: u64, total_units: u64) -> Result<u64, PoolError> {
    let burned = if requested == total_units || requested == held {
        requested
    } else {
        requested.checked_add(1).ok_or(PoolError::Overflow)?
    };
    if burned > held || burned > total_units {
        return Err(PoolError::Underflow);
    }
    Ok(burned)
}

/// Current asset-denominated value of `units`:
/// `floor(units * pool_value / total_units)`.
///
/// Fails with `DivideByZero` when no units exist; read-only callers convert
/// that to 0.
pub fn scaled_amount(units: u64, pool_value: u64, total_units: u64) -> Result<u64, PoolError> {
    mul_div_floor(units, pool_value, total_units)
}

/// Commit a mint: paired checked adds on the account and the pool totals.
pub fn apply_mint(
    account: &mut DepositorAccount,
    ledger: &mut PoolLedger,
    minted: u64,
) -> Result<(), PoolError> {
    let units = account
        .units
        .checked_add(minted)
        .ok_or(PoolError::Overflow)?;
    let total = ledger
        .total_units
        .checked_add(minted)
        .ok_or(PoolError::Overflow)?;
    account.units = units;
    ledger.total_units = total;
    Ok(())
}

/// Commit a burn: paired checked subs on the account and the pool totals.
pub fn apply_burn(
    account: &mut DepositorAccount,
    ledger: &mut PoolLedger,
    burned: u64,
) -> Result<(), PoolError> {
    let units = account
        .units
        .checked_sub(burned)
        .ok_or(PoolError::Underflow)?;
    let total = ledger
        .total_units
        .checked_sub(burned)
        .ok_or(PoolError::Underflow)?;
    account.units = units;
    ledger.total_units = total;
    Ok(())
}

/// Commit a principal increase on deposit.
pub fn apply_principal_added(
    account: &mut DepositorAccount,
    ledger: &mut PoolLedger,
    amount: u64,
) -> Result<(), PoolError> {
    let principal = account
        .principal
        .checked_add(amount)
        .ok_or(PoolError::Overflow)?;
    let total = ledger
        .total_principal
        .checked_add(amount)
        .ok_or(PoolError::Overflow)?;
    account.principal = principal;
    ledger.total_principal = total;
    Ok(())
}

/// Commit a principal retirement on withdrawal.
pub fn apply_principal_retired(
    account: &mut DepositorAccount,
    ledger: &mut PoolLedger,
    amount: u64,
) -> Result<(), PoolError> {
    let principal = account
        .principal
        .checked_sub(amount)
        .ok_or(PoolError::Underflow)?;
    let total = ledger
        .total_principal
        .checked_sub(amount)
        .ok_or(PoolError::Underflow)?;
    account.principal = principal;
    ledger.total_principal = total;
    Ok(())
}

/// Overflow guard used before any external interaction: verifies that a
/// mint of `amount` asset and `minted` units will commit cleanly.
pub fn check_mint_fits(
    account: &DepositorAccount,
    ledger: &PoolLedger,
    amount: u64,
    minted: u64,
) -> Result<(), PoolError> {
    account
        .units
        .checked_add(minted)
        .ok_or(PoolError::Overflow)?;
    ledger
        .total_units
        .checked_add(minted)
        .ok_or(PoolError::Overflow)?;
    account
        .principal
        .checked_add(amount)
        .ok_or(PoolError::Overflow)?;
    ledger
        .total_principal
        .checked_add(amount)
        .ok_or(PoolError::Overflow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_mint_is_one_to_one() {
        assert_eq!(units_for_deposit(1000, 0, 0).unwrap(), 1000);
    }

    #[test]
    fn test_proportional_mint_rounds_down() {
        // Pool value 2000, 1000 units outstanding: 2:1 value per unit.
        assert_eq!(units_for_deposit(500, 2000, 1000).unwrap(), 250);
        // 999 * 1000 / 2000 = 499.5 floors to 499
        assert_eq!(units_for_deposit(999, 2000, 1000).unwrap(), 499);
    }

    #[test]
    fn test_mint_rejects_zero_amount() {
        assert_eq!(units_for_deposit(0, 2000, 1000), Err(PoolError::InvalidAmount));
        assert_eq!(units_for_deposit(0, 0, 0), Err(PoolError::InvalidAmount));
    }

    #[test]
    fn test_mint_rejects_zero_pool_value_with_units_outstanding() {
        assert_eq!(units_for_deposit(100, 0, 1000), Err(PoolError::DivideByZero));
    }

    #[test]
    fn test_burn_exact_on_full_drain_of_holder() {
        // Holder drains their own units: no buffer.
        assert_eq!(burn_for_request(300, 300, 1000).unwrap(), 300);
    }

    #[test]
    fn test_burn_exact_on_full_drain_of_pool() {
        assert_eq!(burn_for_request(1000, 1000, 1000).unwrap(), 1000);
    }

    #[test]
    fn test_partial_burn_adds_buffer_unit() {
        assert_eq!(burn_for_request(100, 300, 1000).unwrap(), 101);
    }

    #[test]
    fn test_burn_buffer_cannot_exceed_held() {
        // 299 + 1 = 300 == held is fine; 300 would be exact drain.
        assert_eq!(burn_for_request(299, 300, 1000).unwrap(), 300);
        // Buffer pushes past held units.
        assert_eq!(burn_for_request(250, 250, 1000).unwrap(), 250);
        assert_eq!(burn_for_request(250, 249, 1000), Err(PoolError::Underflow));
    }

    #[test]
    fn test_scaled_amount_floors() {
        assert_eq!(scaled_amount(1, 1100, 1000).unwrap(), 1);
        assert_eq!(scaled_amount(500, 1100, 1000).unwrap(), 550);
        assert_eq!(scaled_amount(0, 1100, 1000).unwrap(), 0);
    }

    #[test]
    fn test_scaled_amount_no_units() {
        assert_eq!(scaled_amount(1, 1000, 0), Err(PoolError::DivideByZero));
    }

    #[test]
    fn test_apply_mint_and_burn_are_paired() {
        let mut acct = DepositorAccount::default();
        let mut pool = PoolLedger::default();

        apply_mint(&mut acct, &mut pool, 1000).unwrap();
        assert_eq!(acct.units, 1000);
        assert_eq!(pool.total_units, 1000);

        apply_burn(&mut acct, &mut pool, 400).unwrap();
        assert_eq!(acct.units, 600);
        assert_eq!(pool.total_units, 600);
    }

    #[test]
    fn test_apply_burn_underflow_leaves_state_untouched() {
        let mut acct = DepositorAccount {
            principal: 0,
            units: 10,
        };
        let mut pool = PoolLedger {
            total_principal: 0,
            total_units: 10,
            last_pool_value: 0,
        };
        assert_eq!(
            apply_burn(&mut acct, &mut pool, 11),
            Err(PoolError::Underflow)
        );
        assert_eq!(acct.units, 10);
        assert_eq!(pool.total_units, 10);
    }

    #[test]
    fn test_principal_tracking() {
        let mut acct = DepositorAccount::default();
        let mut pool = PoolLedger::default();

        apply_principal_added(&mut acct, &mut pool, 700).unwrap();
        apply_principal_retired(&mut acct, &mut pool, 200).unwrap();
        assert_eq!(acct.principal, 500);
        assert_eq!(pool.total_principal, 500);
        assert_eq!(
            apply_principal_retired(&mut acct, &mut pool, 501),
            Err(PoolError::Underflow)
        );
    }
}
