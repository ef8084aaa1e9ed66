//! Error taxonomy for feeder pool operations.
//!
//! Every error aborts the whole request with no surviving state mutation;
//! nothing is retried internally.

use pool_model::PoolError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeederError {
    /// Caller lacks the required role or relationship
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Operation disallowed by the current gate flags or pool state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Zero or otherwise out-of-domain amount
    #[error("invalid amount")]
    InvalidAmount,

    /// Requested amount exceeds the redeemable balance, or the ledger lacks
    /// funds for a forwarding operation
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Internal accounting invariant would be violated; fatal for the request
    #[error("arithmetic fault in accounting")]
    Arithmetic,
}

impl From<PoolError> for FeederError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::InvalidAmount => FeederError::InvalidAmount,
            PoolError::InsufficientBalance => FeederError::InsufficientFunds,
            PoolError::Overflow | PoolError::Underflow | PoolError::DivideByZero => {
                FeederError::Arithmetic
            }
        }
    }
}
