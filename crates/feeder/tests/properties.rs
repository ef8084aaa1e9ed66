//! Property suite for the feeder pool.
//!
//! Drives random action sequences against the in-memory collaborators and
//! checks the global invariants after every step:
//! - conservation of principal and unit totals
//! - no state mutation on a failed request
//! - `max_withdrawal(d) <= total_balance(d)` for every depositor
//! - no value creation on deposit/withdraw-all round trips

use cascade_feeder::sim::{MemoryLedger, NullCheckpoint, SimMasterPool};
use cascade_feeder::{Address, FeederPool, MasterPoolOracle, MemoryGate, PoolSnapshot};
use pool_model::PoolConfig;
use proptest::prelude::*;

type Pool = FeederPool<MemoryLedger, SimMasterPool, NullCheckpoint, MemoryGate>;

const DEPOSITORS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Debug, Clone)]
enum Action {
    Deposit { who: usize, amount: u64 },
    Withdraw { who: usize, amount: u64 },
    WithdrawAll { who: usize },
    AccrueBacked { interest: u64 },
    LendOut { amount: u64 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..DEPOSITORS.len(), 0u64..50_000).prop_map(|(who, amount)| Action::Deposit { who, amount }),
        (0..DEPOSITORS.len(), 0u64..60_000)
            .prop_map(|(who, amount)| Action::Withdraw { who, amount }),
        (0..DEPOSITORS.len()).prop_map(|who| Action::WithdrawAll { who }),
        (1u64..5_000).prop_map(|interest| Action::AccrueBacked { interest }),
        (1u64..5_000).prop_map(|amount| Action::LendOut { amount }),
    ]
}

fn fresh_pool(share: u8) -> Pool {
    let mut pool = FeederPool::new(
        Address::from_label("feeder"),
        Address::from_label("dev-sink"),
        PoolConfig::new(share, 0).unwrap(),
        MemoryLedger::new(),
        SimMasterPool::new(Address::from_label("master"), Address::from_label("usd")),
        NullCheckpoint,
        MemoryGate::new(),
    );
    for who in DEPOSITORS {
        pool.ledger_mut().mint(Address::from_label(who), 1_000_000);
    }
    pool
}

/// Everything an action may mutate: accounting, balances, master claims.
fn capture(pool: &Pool) -> (PoolSnapshot, Vec<(Address, u64)>, u64) {
    (
        pool.snapshot(),
        pool.ledger().balances().collect(),
        pool.master().feeder_pool_value(pool.address()),
    )
}

fn assert_conservation(pool: &Pool) {
    let snapshot = pool.snapshot();
    let principal: u64 = snapshot.accounts.iter().map(|(_, p, _)| p).sum();
    let units: u64 = snapshot.accounts.iter().map(|(_, _, u)| u).sum();
    assert_eq!(principal, snapshot.total_principal, "principal conservation");
    assert_eq!(units, snapshot.total_units, "unit conservation");
}

fn assert_liquidity_cap(pool: &Pool) {
    for who in DEPOSITORS {
        let addr = Address::from_label(who);
        assert!(
            pool.max_withdrawal(addr) <= pool.total_balance(addr),
            "liquidity cap exceeded for {who}"
        );
    }
}

fn apply(pool: &mut Pool, action: &Action) -> Result<(), cascade_feeder::FeederError> {
    match *action {
        Action::Deposit { who, amount } => pool
            .deposit(Address::from_label(DEPOSITORS[who]), amount)
            .map(|_| ()),
        Action::Withdraw { who, amount } => pool
            .withdraw(Address::from_label(DEPOSITORS[who]), amount)
            .map(|_| ()),
        Action::WithdrawAll { who } => pool
            .withdraw_all(Address::from_label(DEPOSITORS[who]))
            .map(|_| ()),
        Action::AccrueBacked { interest } => {
            let feeder = pool.address();
            pool.master_mut().accrue(feeder, interest);
            pool.ledger_mut().mint(Address::from_label("master"), interest);
            Ok(())
        }
        Action::LendOut { amount } => {
            // Ignore shortfalls: an empty master pool just stays empty.
            let _ = pool.ledger_mut().burn(Address::from_label("master"), amount);
            Ok(())
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_under_random_sequences(
        actions in proptest::collection::vec(action_strategy(), 1..40),
        share in 0u8..=100,
    ) {
        let mut pool = fresh_pool(share);
        for action in &actions {
            let before = capture(&pool);
            let result = apply(&mut pool, action);
            if result.is_err() {
                // A failed request must leave every observable unchanged.
                prop_assert_eq!(&capture(&pool), &before, "mutation on error: {:?}", action);
            }
            assert_conservation(&pool);
            assert_liquidity_cap(&pool);
        }
    }

    #[test]
    fn round_trip_pays_out_at_most_the_deposit(
        seed_amount in 1u64..1_000_000,
        amount in 1u64..1_000_000,
        share in 0u8..=100,
    ) {
        let mut pool = fresh_pool(share);
        pool.deposit(Address::from_label("bob"), seed_amount).unwrap();

        pool.deposit(Address::from_label("alice"), amount).unwrap();
        let record = pool.withdraw_all(Address::from_label("alice")).unwrap();
        prop_assert!(record.payout <= amount, "payout {} > deposit {}", record.payout, amount);
        prop_assert!(pool.account(Address::from_label("alice")).is_empty());
    }

    #[test]
    fn partial_withdrawals_never_deflate_remaining_unit_value(
        amounts in proptest::collection::vec(1u64..10_000, 1..10),
    ) {
        let mut pool = fresh_pool(60);
        pool.deposit(Address::from_label("alice"), 100_000).unwrap();
        pool.deposit(Address::from_label("bob"), 100_000).unwrap();

        for amount in amounts {
            let ledger = pool.pool_ledger();
            let value = pool.master().feeder_pool_value(pool.address());
            let before = (value as u128) * 1_000_000_000 / (ledger.total_units as u128);

            if pool.withdraw(Address::from_label("alice"), amount).is_ok() {
                let ledger = pool.pool_ledger();
                let value = pool.master().feeder_pool_value(pool.address());
                let after = (value as u128) * 1_000_000_000 / (ledger.total_units as u128);
                prop_assert!(after >= before, "unit value fell: {} -> {}", before, after);
            }
        }
    }
}
