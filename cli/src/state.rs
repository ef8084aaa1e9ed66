//! Simulation state file: the feeder pool snapshot plus its in-memory
//! collaborators, round-tripped through JSON between invocations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cascade_feeder::sim::{MemoryLedger, NullCheckpoint, SimMasterPool};
use cascade_feeder::{Address, FeederPool, MemoryGate, PoolSnapshot};
use pool_model::PoolConfig;
use serde::{Deserialize, Serialize};

pub const POOL_LABEL: &str = "feeder-pool";
pub const MASTER_LABEL: &str = "master-pool";
pub const DEV_SINK_LABEL: &str = "dev-sink";
pub const ASSET_LABEL: &str = "base-asset";

pub type SimPool = FeederPool<MemoryLedger, SimMasterPool, NullCheckpoint, MemoryGate>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub pool: PoolSnapshot,
    pub ledger: MemoryLedger,
    pub master: SimMasterPool,
    pub gate: MemoryGate,
}

impl SimState {
    /// Fresh simulation with an empty pool.
    pub fn init(depositor_share_percent: u8, impairment_rank: u8) -> Result<Self> {
        let config = PoolConfig::new(depositor_share_percent, impairment_rank)
            .map_err(|_| anyhow::anyhow!("depositor share must be 0..=100"))?;
        let pool = FeederPool::new(
            Address::from_label(POOL_LABEL),
            Address::from_label(DEV_SINK_LABEL),
            config,
            MemoryLedger::new(),
            SimMasterPool::new(
                Address::from_label(MASTER_LABEL),
                Address::from_label(ASSET_LABEL),
            ),
            NullCheckpoint,
            MemoryGate::new(),
        );
        Ok(Self::from_pool(&pool))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("no simulation state at {} (run `init` first)", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("corrupt state file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serialize state")?;
        fs::write(path, raw).with_context(|| format!("write state file {}", path.display()))
    }

    /// Bind the snapshot back to live collaborators.
    pub fn into_pool(self) -> Result<SimPool> {
        FeederPool::from_snapshot(self.pool, self.ledger, self.master, NullCheckpoint, self.gate)
            .map_err(|e| anyhow::anyhow!("state file rejected: {e}"))
    }

    pub fn from_pool(pool: &SimPool) -> Self {
        Self {
            pool: pool.snapshot(),
            ledger: pool.ledger().clone(),
            master: pool.master().clone(),
            gate: pool.gate().clone(),
        }
    }
}
