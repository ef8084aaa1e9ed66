//! Settlement records emitted for audit and indexing. Behavior-neutral.

use crate::traits::Address;

/// Emitted after a successful deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRecord {
    pub depositor: Address,
    pub amount: u64,
    pub units_minted: u64,
    /// Pool-wide totals after the deposit
    pub total_principal: u64,
    pub total_units: u64,
}

/// Emitted after a successful withdrawal (partial or full).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalRecord {
    pub depositor: Address,
    /// Requested amount for partial withdrawals; the full claim for exits
    pub amount_requested: u64,
    /// Gross asset amount pulled back from the master pool
    pub payout: u64,
    /// Protocol cut of the interest component
    pub dev_share: u64,
    pub principal_retired: u64,
    pub units_burned: u64,
    /// payout - dev_share - principal_retired. Negative only from rounding
    /// dust, never from loss of principal.
    pub net_interest: i128,
    /// Pool-wide totals after the withdrawal
    pub total_principal: u64,
    pub total_units: u64,
}

/// Emitted whenever the cached master pool value moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolValueChanged {
    pub previous: u64,
    pub current: u64,
}
