//! The feeder pool: deposit/withdraw orchestration over the pure accounting
//! model and the external collaborators.
//!
//! Requests execute atomically. All external interactions (ledger transfers,
//! master pool calls) complete before any accounting state is committed, so
//! a failed interaction aborts with no surviving mutation. The reentrancy
//! flag covers the window where control passes to collaborator code.

use std::cell::Cell;
use std::collections::BTreeMap;

use log::{debug, info};
use pool_model::{
    burn_for_request, check_mint_fits, dev_share, net_balance, quote_full, quote_partial,
    scaled_amount, units_for_deposit, DepositorAccount, PoolConfig, PoolLedger, WithdrawalQuote,
};

use crate::errors::FeederError;
use crate::events::{DepositRecord, PoolValueChanged, WithdrawalRecord};
use crate::traits::{AccessGate, Address, AssetLedger, MasterPoolOracle, RewardAccrualCheckpoint};

/// Full accounting state of a feeder pool, for state files and audits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSnapshot {
    pub address: Address,
    pub dev_sink: Address,
    pub depositor_share_percent: u8,
    pub impairment_rank: u8,
    pub total_principal: u64,
    pub total_units: u64,
    pub last_pool_value: u64,
    /// (depositor, principal, units)
    pub accounts: Vec<(Address, u64, u64)>,
}

/// A feeder pool bound to its collaborators.
pub struct FeederPool<L, M, R, G>
where
    L: AssetLedger,
    M: MasterPoolOracle,
    R: RewardAccrualCheckpoint,
    G: AccessGate,
{
    address: Address,
    dev_sink: Address,
    config: PoolConfig,
    accounts: BTreeMap<Address, DepositorAccount>,
    pool: PoolLedger,
    ledger: L,
    master: M,
    checkpoint: R,
    gate: G,
    entered: Cell<bool>,
}

impl<L, M, R, G> FeederPool<L, M, R, G>
where
    L: AssetLedger,
    M: MasterPoolOracle,
    R: RewardAccrualCheckpoint,
    G: AccessGate,
{
    pub fn new(
        address: Address,
        dev_sink: Address,
        config: PoolConfig,
        ledger: L,
        master: M,
        checkpoint: R,
        gate: G,
    ) -> Self {
        Self {
            address,
            dev_sink,
            config,
            accounts: BTreeMap::new(),
            pool: PoolLedger::default(),
            ledger,
            master,
            checkpoint,
            gate,
            entered: Cell::new(false),
        }
    }

    /// Rebuild a pool around previously captured accounting state.
    pub fn from_snapshot(
        snapshot: PoolSnapshot,
        ledger: L,
        master: M,
        checkpoint: R,
        gate: G,
    ) -> Result<Self, FeederError> {
        let config = PoolConfig::new(snapshot.depositor_share_percent, snapshot.impairment_rank)?;
        let mut accounts = BTreeMap::new();
        let mut principal_sum: u64 = 0;
        let mut unit_sum: u64 = 0;
        for (addr, principal, units) in snapshot.accounts {
            principal_sum = principal_sum
                .checked_add(principal)
                .ok_or(FeederError::Arithmetic)?;
            unit_sum = unit_sum.checked_add(units).ok_or(FeederError::Arithmetic)?;
            accounts.insert(addr, DepositorAccount { principal, units });
        }
        // A snapshot that breaks conservation is corrupt; refuse it.
        if principal_sum != snapshot.total_principal || unit_sum != snapshot.total_units {
            return Err(FeederError::InvalidState("snapshot breaks conservation"));
        }
        Ok(Self {
            address: snapshot.address,
            dev_sink: snapshot.dev_sink,
            config,
            accounts,
            pool: PoolLedger {
                total_principal: snapshot.total_principal,
                total_units: snapshot.total_units,
                last_pool_value: snapshot.last_pool_value,
            },
            ledger,
            master,
            checkpoint,
            gate,
            entered: Cell::new(false),
        })
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            address: self.address,
            dev_sink: self.dev_sink,
            depositor_share_percent: self.config.depositor_share_percent,
            impairment_rank: self.config.impairment_rank,
            total_principal: self.pool.total_principal,
            total_units: self.pool.total_units,
            last_pool_value: self.pool.last_pool_value,
            accounts: self
                .accounts
                .iter()
                .map(|(addr, acct)| (*addr, acct.principal, acct.units))
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // State-changing entry points
    // ------------------------------------------------------------------

    /// Deposit `amount` of the base asset for `depositor`: pull the funds,
    /// forward them to the master pool, and mint interest units against the
    /// pre-deposit pool value.
    pub fn deposit(
        &mut self,
        depositor: Address,
        amount: u64,
    ) -> Result<DepositRecord, FeederError> {
        self.enter()?;
        let result = self.deposit_inner(depositor, amount);
        self.entered.set(false);
        result
    }

    fn deposit_inner(
        &mut self,
        depositor: Address,
        amount: u64,
    ) -> Result<DepositRecord, FeederError> {
        if !self.gate.pool_active() {
            return Err(FeederError::InvalidState("pool deactivated"));
        }
        if !self.gate.deposits_enabled() {
            return Err(FeederError::InvalidState("deposits disabled"));
        }
        if amount == 0 {
            return Err(FeederError::InvalidAmount);
        }

        self.checkpoint.checkpoint_global();
        self.checkpoint.checkpoint_depositor(depositor, amount);

        // Value must be read fresh, after the checkpoint and before the new
        // funds are counted anywhere.
        let pool_value = self.master.feeder_pool_value_latest(self.address);
        let minted = units_for_deposit(amount, pool_value, self.pool.total_units)?;

        let account = self.accounts.get(&depositor).copied().unwrap_or_default();
        check_mint_fits(&account, &self.pool, amount, minted)?;

        // Interactions before commit: an aborted transfer leaves no trace.
        self.ledger.transfer(depositor, self.address, amount)?;
        self.ledger.approve(self.address, self.master.address(), amount)?;
        self.master
            .deposit_feeder(self.address, amount, &mut self.ledger)?;

        let entry = self.accounts.entry(depositor).or_default();
        pool_model::apply_mint(entry, &mut self.pool, minted)?;
        pool_model::apply_principal_added(entry, &mut self.pool, amount)?;
        let _ = self.refresh_pool_value();

        info!(
            "deposit: depositor={depositor} amount={amount} units_minted={minted} \
             total_principal={} total_units={}",
            self.pool.total_principal, self.pool.total_units
        );
        Ok(DepositRecord {
            depositor,
            amount,
            units_minted: minted,
            total_principal: self.pool.total_principal,
            total_units: self.pool.total_units,
        })
    }

    /// Partial withdrawal of `amount`. The request must be strictly below
    /// the depositor's current total balance; a full exit goes through
    /// [`FeederPool::withdraw_all`].
    pub fn withdraw(
        &mut self,
        depositor: Address,
        amount: u64,
    ) -> Result<WithdrawalRecord, FeederError> {
        self.enter()?;
        let result = self.withdraw_inner(depositor, amount);
        self.entered.set(false);
        result
    }

    fn withdraw_inner(
        &mut self,
        depositor: Address,
        amount: u64,
    ) -> Result<WithdrawalRecord, FeederError> {
        self.check_withdraw_gate()?;
        if amount == 0 {
            return Err(FeederError::InvalidAmount);
        }

        self.checkpoint.checkpoint_global();
        self.checkpoint.checkpoint_depositor(depositor, amount);

        let pool_value = self.master.feeder_pool_value_latest(self.address);
        let account = self.accounts.get(&depositor).copied().unwrap_or_default();
        if account.units == 0 {
            return Err(FeederError::InsufficientFunds);
        }

        let total_balance = scaled_amount(account.units, pool_value, self.pool.total_units)?;
        let quote = quote_partial(account.units, account.principal, amount, total_balance)?;
        self.settle(depositor, account, quote, pool_value, amount)
    }

    /// Full exit: burn all units and retire all principal, skipping the
    /// proportionality math.
    pub fn withdraw_all(&mut self, depositor: Address) -> Result<WithdrawalRecord, FeederError> {
        self.enter()?;
        let result = self.withdraw_all_inner(depositor);
        self.entered.set(false);
        result
    }

    fn withdraw_all_inner(&mut self, depositor: Address) -> Result<WithdrawalRecord, FeederError> {
        self.check_withdraw_gate()?;

        let account = self.accounts.get(&depositor).copied().unwrap_or_default();
        if account.units == 0 {
            return Err(FeederError::InvalidAmount);
        }

        self.checkpoint.checkpoint_global();
        self.checkpoint
            .checkpoint_depositor(depositor, account.units);

        let pool_value = self.master.feeder_pool_value_latest(self.address);
        let quote = quote_full(account.units, account.principal);
        let amount_requested = scaled_amount(account.units, pool_value, self.pool.total_units)?;
        self.settle(depositor, account, quote, pool_value, amount_requested)
    }

    // ------------------------------------------------------------------
    // Read-only valuation
    // ------------------------------------------------------------------

    /// The depositor's redeemable balance: principal in full plus their
    /// share of accrued interest. Zero when the pool is inactive or no
    /// units exist. Uses the same split function as settlement, so the
    /// quoted figure and the settled payout cannot disagree.
    pub fn total_balance(&self, depositor: Address) -> u64 {
        if !self.gate.pool_active() || self.pool.total_units == 0 {
            return 0;
        }
        let account = self.accounts.get(&depositor).copied().unwrap_or_default();
        if account.units == 0 {
            return 0;
        }
        let pool_value = self.master.feeder_pool_value(self.address);
        let gross = match scaled_amount(account.units, pool_value, self.pool.total_units) {
            Ok(v) => v,
            Err(_) => return 0,
        };
        net_balance(
            gross,
            account.principal,
            self.config.depositor_share_percent,
            self.gate.is_internal_bridge(depositor),
        )
    }

    /// [`FeederPool::total_balance`] capped by the liquidity actually
    /// available at the master pool.
    pub fn max_withdrawal(&self, depositor: Address) -> u64 {
        let balance = self.total_balance(depositor);
        if balance == 0 {
            return 0;
        }
        let account = self.accounts.get(&depositor).copied().unwrap_or_default();
        let pool_value = self.master.feeder_pool_value(self.address);
        let gross = match scaled_amount(account.units, pool_value, self.pool.total_units) {
            Ok(v) => v,
            Err(_) => return 0,
        };
        let available = self.ledger.balance_of(self.master.address());
        pool_model::max_withdrawal(
            gross,
            balance,
            account.principal,
            self.pool.total_units,
            pool_value,
            available,
        )
    }

    pub fn account(&self, depositor: Address) -> DepositorAccount {
        self.accounts.get(&depositor).copied().unwrap_or_default()
    }

    pub fn pool_ledger(&self) -> PoolLedger {
        self.pool
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn dev_sink(&self) -> Address {
        self.dev_sink
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn master(&self) -> &M {
        &self.master
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn checkpoint(&self) -> &R {
        &self.checkpoint
    }

    // Governance/simulation surface. Role checks live outside this core.

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    pub fn set_depositor_share_percent(&mut self, percent: u8) -> Result<(), FeederError> {
        self.config = PoolConfig::new(percent, self.config.impairment_rank)?;
        Ok(())
    }

    pub fn set_impairment_rank(&mut self, rank: u8) {
        self.config.impairment_rank = rank;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Reentrancy check: a state-mutating entry point must not run while
    /// another one is mid-flight on this pool.
    fn enter(&self) -> Result<(), FeederError> {
        if self.entered.replace(true) {
            return Err(FeederError::InvalidState("reentrant call"));
        }
        Ok(())
    }

    fn check_withdraw_gate(&self) -> Result<(), FeederError> {
        if !self.gate.pool_active() {
            return Err(FeederError::InvalidState("pool deactivated"));
        }
        if !self.gate.withdrawals_enabled() {
            return Err(FeederError::InvalidState("withdrawals disabled"));
        }
        Ok(())
    }

    /// Execute a quoted withdrawal: value the burn, split the dev share,
    /// pull the payout from the master pool, pay the parties, then commit
    /// the accounting deltas.
    fn settle(
        &mut self,
        depositor: Address,
        account: DepositorAccount,
        quote: WithdrawalQuote,
        pool_value: u64,
        amount_requested: u64,
    ) -> Result<WithdrawalRecord, FeederError> {
        // Pre-burn valuation: the buffer unit burned on partials is donated,
        // not paid out.
        let payout = scaled_amount(quote.units_to_burn, pool_value, self.pool.total_units)?;
        let bridge = self.gate.is_internal_bridge(depositor);
        let dev = dev_share(
            payout,
            quote.principal_to_retire,
            self.config.depositor_share_percent,
            bridge,
        );

        // Validate the whole commit up front so the ledger interactions
        // below can never be followed by an accounting failure.
        let burned = burn_for_request(quote.units_to_burn, account.units, self.pool.total_units)?;
        if quote.principal_to_retire > account.principal {
            return Err(FeederError::Arithmetic);
        }

        self.master
            .withdraw_feeder(self.address, payout, &mut self.ledger)?;
        self.ledger
            .transfer(self.address, depositor, payout - dev)?;
        if dev > 0 {
            self.ledger.transfer(self.address, self.dev_sink, dev)?;
        }

        let entry = self.accounts.entry(depositor).or_default();
        pool_model::apply_burn(entry, &mut self.pool, burned)?;
        pool_model::apply_principal_retired(entry, &mut self.pool, quote.principal_to_retire)?;
        let _ = self.refresh_pool_value();

        let net_interest =
            payout as i128 - dev as i128 - quote.principal_to_retire as i128;
        info!(
            "withdraw: depositor={depositor} requested={amount_requested} payout={payout} \
             dev_share={dev} principal_retired={} units_burned={burned} net_interest={net_interest}",
            quote.principal_to_retire
        );
        Ok(WithdrawalRecord {
            depositor,
            amount_requested,
            payout,
            dev_share: dev,
            principal_retired: quote.principal_to_retire,
            units_burned: burned,
            net_interest,
            total_principal: self.pool.total_principal,
            total_units: self.pool.total_units,
        })
    }

    fn refresh_pool_value(&mut self) -> Option<PoolValueChanged> {
        let current = self.master.feeder_pool_value(self.address);
        let previous = self.pool.last_pool_value;
        self.pool.last_pool_value = current;
        if current != previous {
            debug!("pool value changed: {previous} -> {current}");
            Some(PoolValueChanged { previous, current })
        } else {
            None
        }
    }
}
