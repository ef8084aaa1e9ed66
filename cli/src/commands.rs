//! Command handlers: each one loads the state file, drives the pool, prints
//! the outcome, and persists the new state.

use std::path::Path;

use anyhow::Result;
use cascade_feeder::{AccessGate, Address, AssetLedger, MasterPoolOracle};
use colored::Colorize;
use serde_json::json;

use crate::state::{SimState, MASTER_LABEL};

pub fn init(path: &Path, share: u8, rank: u8) -> Result<()> {
    let state = SimState::init(share, rank)?;
    state.save(path)?;
    println!("{}", "=== Pool Initialized ===".bright_green().bold());
    println!("{} {}", "Depositor share:".bright_cyan(), format!("{share}%"));
    println!("{} {}", "Impairment rank:".bright_cyan(), rank);
    println!("{} {}", "State file:".bright_cyan(), path.display());
    Ok(())
}

pub fn fund(path: &Path, account: &str, amount: u64) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    let addr = Address::from_label(account);
    pool.ledger_mut().mint(addr, amount);
    SimState::from_pool(&pool).save(path)?;
    println!(
        "{} minted {} to {}",
        "✓".bright_green(),
        amount.to_string().bright_white(),
        account
    );
    Ok(())
}

pub fn deposit(path: &Path, account: &str, amount: u64) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    let record = pool.deposit(Address::from_label(account), amount)?;
    SimState::from_pool(&pool).save(path)?;

    println!("{}", "=== Deposit ===".bright_green().bold());
    println!("{} {}", "Depositor:".bright_cyan(), account);
    println!("{} {}", "Amount:".bright_cyan(), record.amount);
    println!("{} {}", "Units minted:".bright_cyan(), record.units_minted);
    println!(
        "{} {} / {}",
        "Pool totals (principal/units):".bright_cyan(),
        record.total_principal,
        record.total_units
    );
    Ok(())
}

pub fn withdraw(path: &Path, account: &str, amount: Option<u64>) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    let addr = Address::from_label(account);
    let record = match amount {
        Some(amount) => pool.withdraw(addr, amount)?,
        None => pool.withdraw_all(addr)?,
    };
    SimState::from_pool(&pool).save(path)?;

    let title = if amount.is_some() {
        "=== Withdrawal ==="
    } else {
        "=== Full Withdrawal ==="
    };
    println!("{}", title.bright_green().bold());
    println!("{} {}", "Depositor:".bright_cyan(), account);
    println!("{} {}", "Payout:".bright_cyan(), record.payout);
    println!("{} {}", "Dev share:".bright_cyan(), record.dev_share);
    println!(
        "{} {}",
        "Received:".bright_cyan(),
        record.payout - record.dev_share
    );
    println!(
        "{} {}",
        "Principal retired:".bright_cyan(),
        record.principal_retired
    );
    println!("{} {}", "Units burned:".bright_cyan(), record.units_burned);
    let net = record.net_interest;
    let net_str = if net >= 0 {
        format!("+{net}").bright_green()
    } else {
        format!("{net}").bright_red()
    };
    println!("{} {}", "Net interest:".bright_cyan(), net_str);
    Ok(())
}

pub fn accrue(path: &Path, interest: u64, deployed: bool) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    let feeder = pool.address();
    let master = Address::from_label(MASTER_LABEL);
    pool.master_mut().accrue(feeder, interest);
    if !deployed {
        // Back the new value with liquid balance at the master pool.
        pool.ledger_mut().mint(master, interest);
    }
    SimState::from_pool(&pool).save(path)?;
    println!(
        "{} accrued {} interest{}",
        "✓".bright_green(),
        interest,
        if deployed { " (deployed, not liquid)" } else { "" }
    );
    Ok(())
}

pub fn lend_out(path: &Path, amount: u64) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    let master = Address::from_label(MASTER_LABEL);
    pool.ledger_mut().burn(master, amount)?;
    SimState::from_pool(&pool).save(path)?;
    println!(
        "{} lent out {} (master liquidity reduced, value unchanged)",
        "✓".bright_green(),
        amount
    );
    Ok(())
}

pub fn balance(path: &Path, account: &str) -> Result<()> {
    let pool = SimState::load(path)?.into_pool()?;
    let addr = Address::from_label(account);
    let acct = pool.account(addr);

    println!("{}", "=== Balance ===".bright_green().bold());
    println!("{} {}", "Depositor:".bright_cyan(), account);
    println!("{} {}", "Principal:".bright_cyan(), acct.principal);
    println!("{} {}", "Units:".bright_cyan(), acct.units);
    println!(
        "{} {}",
        "Total balance:".bright_cyan(),
        pool.total_balance(addr)
    );
    println!(
        "{} {}",
        "Max withdrawal:".bright_cyan(),
        pool.max_withdrawal(addr)
    );
    println!(
        "{} {}",
        "Wallet:".bright_cyan(),
        pool.ledger().balance_of(addr)
    );
    Ok(())
}

pub fn status(path: &Path, as_json: bool) -> Result<()> {
    let pool = SimState::load(path)?.into_pool()?;
    let ledger = pool.pool_ledger();
    let config = pool.config();
    let value = pool.master().feeder_pool_value(pool.address());
    let available = pool.ledger().balance_of(Address::from_label(MASTER_LABEL));

    if as_json {
        let snapshot = pool.snapshot();
        let accounts: Vec<_> = snapshot
            .accounts
            .iter()
            .map(|(addr, principal, units)| {
                json!({
                    "depositor": addr.to_string(),
                    "principal": principal,
                    "units": units,
                    "total_balance": pool.total_balance(*addr),
                    "max_withdrawal": pool.max_withdrawal(*addr),
                })
            })
            .collect();
        let doc = json!({
            "pool_value": value,
            "available_liquidity": available,
            "total_principal": ledger.total_principal,
            "total_units": ledger.total_units,
            "depositor_share_percent": config.depositor_share_percent,
            "impairment_rank": config.impairment_rank,
            "active": pool.gate().pool_active(),
            "deposits_enabled": pool.gate().deposits_enabled(),
            "withdrawals_enabled": pool.gate().withdrawals_enabled(),
            "accounts": accounts,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", "=== Pool Status ===".bright_green().bold());
    println!("{} {}", "Pool value:".bright_cyan(), value);
    println!("{} {}", "Available liquidity:".bright_cyan(), available);
    println!("{} {}", "Total principal:".bright_cyan(), ledger.total_principal);
    println!("{} {}", "Total units:".bright_cyan(), ledger.total_units);
    println!(
        "{} {}%",
        "Depositor share:".bright_cyan(),
        config.depositor_share_percent
    );
    let active = if pool.gate().pool_active() {
        "active".bright_green()
    } else {
        "deactivated".bright_red()
    };
    println!("{} {}", "State:".bright_cyan(), active);
    println!(
        "{} deposits={} withdrawals={}",
        "Flags:".bright_cyan(),
        pool.gate().deposits_enabled(),
        pool.gate().withdrawals_enabled()
    );

    let snapshot = pool.snapshot();
    if snapshot.accounts.is_empty() {
        println!("\n{}", "No depositors".dimmed());
    } else {
        println!("\n{}", "Depositors:".bright_yellow());
        for (addr, principal, units) in snapshot.accounts {
            println!(
                "  {} principal={} units={} balance={} max={}",
                addr.to_string().bright_white(),
                principal,
                units,
                pool.total_balance(addr),
                pool.max_withdrawal(addr)
            );
        }
    }
    Ok(())
}

pub fn gate_set(path: &Path, apply: impl FnOnce(&mut cascade_feeder::MemoryGate)) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    apply(pool.gate_mut());
    SimState::from_pool(&pool).save(path)?;
    println!("{} gate updated", "✓".bright_green());
    Ok(())
}

pub fn set_share(path: &Path, percent: u8) -> Result<()> {
    let mut pool = SimState::load(path)?.into_pool()?;
    pool.set_depositor_share_percent(percent)?;
    SimState::from_pool(&pool).save(path)?;
    println!("{} depositor share set to {percent}%", "✓".bright_green());
    Ok(())
}
