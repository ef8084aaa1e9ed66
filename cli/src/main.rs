//! Cascade CLI - local feeder/master pool simulation
//!
//! Drives a feeder pool against in-memory collaborators, persisting the
//! simulation between invocations in a JSON state file. Useful for
//! exercising deposit/withdrawal settlement, dev-share splits, and
//! liquidity-capped withdrawals end to end.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod state;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Cascade feeder pool - local accounting simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the simulation state file
    #[arg(short, long, default_value = "cascade-state.json")]
    state: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a fresh pool simulation
    Init {
        /// Percent of earned interest depositors keep (protocol takes the rest)
        #[arg(long, default_value = "60")]
        depositor_share: u8,

        /// Impairment rank consumed by the liquidation waterfall
        #[arg(long, default_value = "0")]
        impairment_rank: u8,
    },

    /// Mint wallet balance for an account
    Fund {
        #[arg(short, long)]
        account: String,

        #[arg(long)]
        amount: u64,
    },

    /// Deposit into the feeder pool
    Deposit {
        #[arg(short, long)]
        account: String,

        #[arg(long)]
        amount: u64,
    },

    /// Withdraw from the feeder pool (partial)
    Withdraw {
        #[arg(short, long)]
        account: String,

        #[arg(long)]
        amount: u64,
    },

    /// Withdraw the full balance (burns all units)
    WithdrawAll {
        #[arg(short, long)]
        account: String,
    },

    /// Accrue interest on the feeder's master pool claim
    Accrue {
        #[arg(long)]
        interest: u64,

        /// Grow the claim without liquid backing (capital stays deployed)
        #[arg(long)]
        deployed: bool,
    },

    /// Drain liquid balance from the master pool without touching value
    LendOut {
        #[arg(long)]
        amount: u64,
    },

    /// Show one depositor's position
    Balance {
        #[arg(short, long)]
        account: String,
    },

    /// Show pool totals and all depositors
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Access gate operations
    Gate {
        #[command(subcommand)]
        command: GateCommands,
    },

    /// Set the depositor share percent
    SetShare {
        #[arg(long)]
        percent: u8,
    },
}

#[derive(Subcommand)]
enum GateCommands {
    /// Disable deposits
    PauseDeposits,
    /// Re-enable deposits
    ResumeDeposits,
    /// Disable withdrawals
    PauseWithdrawals,
    /// Re-enable withdrawals
    ResumeWithdrawals,
    /// Deactivate the pool (irreversible)
    Deactivate,
    /// Flag or unflag an internal-bridge address
    SetBridge {
        #[arg(short, long)]
        account: String,

        /// Remove the flag instead of setting it
        #[arg(long)]
        off: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let path = cli.state.as_path();
    match cli.command {
        Commands::Init {
            depositor_share,
            impairment_rank,
        } => commands::init(path, depositor_share, impairment_rank),
        Commands::Fund { account, amount } => commands::fund(path, &account, amount),
        Commands::Deposit { account, amount } => commands::deposit(path, &account, amount),
        Commands::Withdraw { account, amount } => commands::withdraw(path, &account, Some(amount)),
        Commands::WithdrawAll { account } => commands::withdraw(path, &account, None),
        Commands::Accrue { interest, deployed } => commands::accrue(path, interest, deployed),
        Commands::LendOut { amount } => commands::lend_out(path, amount),
        Commands::Balance { account } => commands::balance(path, &account),
        Commands::Status { json } => commands::status(path, json),
        Commands::Gate { command } => match command {
            GateCommands::PauseDeposits => {
                commands::gate_set(path, |g| g.set_deposits_enabled(false))
            }
            GateCommands::ResumeDeposits => {
                commands::gate_set(path, |g| g.set_deposits_enabled(true))
            }
            GateCommands::PauseWithdrawals => {
                commands::gate_set(path, |g| g.set_withdrawals_enabled(false))
            }
            GateCommands::ResumeWithdrawals => {
                commands::gate_set(path, |g| g.set_withdrawals_enabled(true))
            }
            GateCommands::Deactivate => commands::gate_set(path, |g| g.deactivate()),
            GateCommands::SetBridge { account, off } => commands::gate_set(path, |g| {
                g.set_internal_bridge(cascade_feeder::Address::from_label(&account), !off)
            }),
        },
        Commands::SetShare { percent } => commands::set_share(path, percent),
    }
}
