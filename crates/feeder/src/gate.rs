//! In-memory access gate with governance setters.

use std::collections::BTreeSet;

use crate::traits::{AccessGate, Address};

/// Gate state held in memory. Deactivation is irreversible: there is no
/// setter that turns `active` back on.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryGate {
    deposits_enabled: bool,
    withdrawals_enabled: bool,
    active: bool,
    internal_bridges: BTreeSet<Address>,
}

impl MemoryGate {
    /// Fresh gate: active, both flows enabled, no bridges.
    pub fn new() -> Self {
        Self {
            deposits_enabled: true,
            withdrawals_enabled: true,
            active: true,
            internal_bridges: BTreeSet::new(),
        }
    }

    pub fn set_deposits_enabled(&mut self, enabled: bool) {
        self.deposits_enabled = enabled;
    }

    pub fn set_withdrawals_enabled(&mut self, enabled: bool) {
        self.withdrawals_enabled = enabled;
    }

    /// Trip the pool inactive. One-way.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_internal_bridge(&mut self, addr: Address, bridge: bool) {
        if bridge {
            self.internal_bridges.insert(addr);
        } else {
            self.internal_bridges.remove(&addr);
        }
    }
}

impl Default for MemoryGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessGate for MemoryGate {
    fn deposits_enabled(&self) -> bool {
        self.deposits_enabled
    }

    fn withdrawals_enabled(&self) -> bool {
        self.withdrawals_enabled
    }

    fn pool_active(&self) -> bool {
        self.active
    }

    fn is_internal_bridge(&self, addr: Address) -> bool {
        self.internal_bridges.contains(&addr)
    }
}
