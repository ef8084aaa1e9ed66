//! In-memory collaborator implementations.
//!
//! These back the CLI simulator and the test suites: a token ledger with
//! allowance enforcement, a master pool with explicit accrual and a lever to
//! drain its liquid balance, and checkpoint doubles.

use std::collections::BTreeMap;

use crate::errors::FeederError;
use crate::traits::{Address, AssetLedger, MasterPoolOracle, RewardAccrualCheckpoint};

/// Idealized token ledger: balances plus owner/spender allowances.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryLedger {
    balances: BTreeMap<Address, u64>,
    allowances: BTreeMap<Address, BTreeMap<Address, u64>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` out of thin air. Simulation-only surface.
    pub fn mint(&mut self, addr: Address, amount: u64) {
        let balance = self.balances.entry(addr).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Remove `amount` from circulation. Simulation-only surface.
    pub fn burn(&mut self, addr: Address, amount: u64) -> Result<(), FeederError> {
        let balance = self.balances.entry(addr).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(FeederError::InsufficientFunds)?;
        Ok(())
    }

    pub fn total_supply(&self) -> u64 {
        self.balances.values().sum()
    }

    pub fn balances(&self) -> impl Iterator<Item = (Address, u64)> + '_ {
        self.balances.iter().map(|(a, b)| (*a, *b))
    }

    fn debit(&mut self, from: Address, amount: u64) -> Result<(), FeederError> {
        let balance = self.balances.entry(from).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(FeederError::InsufficientFunds)?;
        Ok(())
    }

    fn credit(&mut self, to: Address, amount: u64) -> Result<(), FeederError> {
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(FeederError::Arithmetic)?;
        Ok(())
    }
}

impl AssetLedger for MemoryLedger {
    fn balance_of(&self, addr: Address) -> u64 {
        self.balances.get(&addr).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), FeederError> {
        if self.balance_of(from) < amount {
            return Err(FeederError::InsufficientFunds);
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u64,
    ) -> Result<(), FeederError> {
        self.allowances.entry(owner).or_default().insert(spender, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), FeederError> {
        let allowance = self
            .allowances
            .get(&from)
            .and_then(|m| m.get(&spender))
            .copied()
            .unwrap_or(0);
        if allowance < amount {
            return Err(FeederError::Unauthorized("allowance exceeded"));
        }
        if self.balance_of(from) < amount {
            return Err(FeederError::InsufficientFunds);
        }
        self.allowances
            .entry(from)
            .or_default()
            .insert(spender, allowance - amount);
        self.debit(from, amount)?;
        self.credit(to, amount)
    }
}

/// Master pool simulation: per-feeder claim values, liquid balance on the
/// shared ledger. Accrual is explicit, driven by the host.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimMasterPool {
    address: Address,
    asset: Address,
    values: BTreeMap<Address, u64>,
}

impl SimMasterPool {
    pub fn new(address: Address, asset: Address) -> Self {
        Self {
            address,
            asset,
            values: BTreeMap::new(),
        }
    }

    /// Interest accrual: the feeder's claim grows by `interest`. The caller
    /// is responsible for minting the backing liquidity onto the master's
    /// ledger balance (or not, to model deployed capital).
    pub fn accrue(&mut self, feeder: Address, interest: u64) {
        let value = self.values.entry(feeder).or_default();
        *value = value.saturating_add(interest);
    }
}

impl MasterPoolOracle for SimMasterPool {
    fn address(&self) -> Address {
        self.address
    }

    fn liquidity_asset(&self) -> Address {
        self.asset
    }

    fn deposit_feeder(
        &mut self,
        feeder: Address,
        amount: u64,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), FeederError> {
        ledger.transfer_from(self.address, feeder, self.address, amount)?;
        let value = self.values.entry(feeder).or_default();
        *value = value.checked_add(amount).ok_or(FeederError::Arithmetic)?;
        Ok(())
    }

    fn withdraw_feeder(
        &mut self,
        feeder: Address,
        amount: u64,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), FeederError> {
        let value = self.values.get(&feeder).copied().unwrap_or(0);
        if value < amount {
            return Err(FeederError::InsufficientFunds);
        }
        // Ledger first: a liquidity shortfall aborts before the claim moves.
        ledger.transfer(self.address, feeder, amount)?;
        self.values.insert(feeder, value - amount);
        Ok(())
    }

    fn feeder_pool_value(&self, feeder: Address) -> u64 {
        self.values.get(&feeder).copied().unwrap_or(0)
    }

    fn feeder_pool_value_latest(&mut self, feeder: Address) -> u64 {
        // Simulation accrues explicitly; nothing pending to settle.
        self.feeder_pool_value(feeder)
    }
}

/// Checkpoint double that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCheckpoint;

impl RewardAccrualCheckpoint for NullCheckpoint {
    fn checkpoint_global(&mut self) {}
    fn checkpoint_depositor(&mut self, _depositor: Address, _amount: u64) {}
}

/// Checkpoint double that records every invocation, for asserting that
/// accrual fires before each mint/burn.
#[derive(Debug, Clone, Default)]
pub struct CountingCheckpoint {
    pub global_calls: u32,
    pub depositor_calls: Vec<(Address, u64)>,
}

impl RewardAccrualCheckpoint for CountingCheckpoint {
    fn checkpoint_global(&mut self) {
        self.global_calls += 1;
    }

    fn checkpoint_depositor(&mut self, depositor: Address, amount: u64) {
        self.depositor_calls.push((depositor, amount));
    }
}
