//! Pure accounting model for the cascade feeder pool.
//! No unwrap/panic in non-test code, all functions total, checked math only.
//!
//! This crate is no_std compatible so it can be embedded in constrained
//! runtimes unchanged.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod math;
pub mod settlement;
pub mod state;
pub mod units;

#[cfg(test)]
mod negative_tests;

// Re-export commonly used types
pub use settlement::*;
pub use state::*;
pub use units::*;
