//! Feeder pool orchestration for the cascade protocol.
//!
//! A feeder pool aggregates depositor funds, forwards them into a master
//! pool, and tracks each depositor's proportional claim on pooled principal
//! plus accrued interest with the unit-share model from [`pool_model`].
//! External collaborators — the asset ledger, the master pool, the reward
//! checkpoint, and the access gate — enter through traits so the engine can
//! run against a chain adapter, the in-memory simulator, or a test double
//! without change.

#![forbid(unsafe_code)]

pub mod errors;
pub mod events;
pub mod gate;
pub mod pool;
pub mod sim;
pub mod traits;

pub use errors::FeederError;
pub use events::{DepositRecord, PoolValueChanged, WithdrawalRecord};
pub use gate::MemoryGate;
pub use pool::{FeederPool, PoolSnapshot};
pub use traits::{AccessGate, Address, AssetLedger, MasterPoolOracle, RewardAccrualCheckpoint};
