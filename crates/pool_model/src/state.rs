//! Feeder pool accounting state.
//!
//! Principal and interest units are the only persisted facts per depositor;
//! everything a depositor can redeem is derived from them on demand. The
//! aggregate counters are maintained exactly by paired mint/burn updates and
//! are never recomputed by summation.

/// Per-depositor accounting state. Created on first deposit, decays to zero
/// on full withdrawal but is never explicitly destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepositorAccount {
    /// Asset-denominated principal (deposits minus retired principal)
    pub principal: u64,
    /// Dimensionless interest units held (claim on pool value)
    pub units: u64,
}

impl DepositorAccount {
    pub fn is_empty(&self) -> bool {
        self.principal == 0 && self.units == 0
    }
}

/// Pool-wide aggregate counters.
///
/// Invariants: `total_principal == Σ principal` and `total_units == Σ units`
/// over all depositor accounts, at every observation point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolLedger {
    /// Sum of all depositor principal
    pub total_principal: u64,
    /// Sum of all depositor interest units
    pub total_units: u64,
    /// Pool value as last reported by the master pool, cached for audit
    pub last_pool_value: u64,
}

/// Static pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Fraction of earned interest retained by depositors, 0..=100.
    /// The remainder is the protocol dev share.
    pub depositor_share_percent: u8,
    /// Ordinal consumed by the external liquidation waterfall; opaque here.
    pub impairment_rank: u8,
}

impl PoolConfig {
    pub fn new(depositor_share_percent: u8, impairment_rank: u8) -> Result<Self, PoolError> {
        if depositor_share_percent > 100 {
            return Err(PoolError::InvalidAmount);
        }
        Ok(Self {
            depositor_share_percent,
            impairment_rank,
        })
    }
}

/// Error types for the accounting model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Amount is zero or out of domain
    InvalidAmount,
    /// Requested amount exceeds the redeemable balance
    InsufficientBalance,
    /// Arithmetic overflow
    Overflow,
    /// Unit/principal subtraction would go negative
    Underflow,
    /// Division by a zero pool value or zero unit supply
    DivideByZero,
}
