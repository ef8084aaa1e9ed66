//! Collaborator boundaries: the asset ledger, the master pool, the reward
//! checkpoint, and the access gate. The feeder pool consults these but owns
//! none of them.

use core::fmt;

use crate::errors::FeederError;

/// 32-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    /// Deterministic address from a human-readable label. Labels longer than
    /// 32 bytes are truncated.
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().zip(label.as_bytes()) {
            *dst = *src;
        }
        Address(bytes)
    }

    /// The label this address was derived from, if it is printable.
    pub fn label(&self) -> Option<&str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(32);
        core::str::from_utf8(&self.0[..end]).ok().filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label() {
            return write!(f, "{label}");
        }
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// Addresses serialize as strings so they can key JSON maps in state files:
// the label when printable, 64 hex chars otherwise.
#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            let mut bytes = [0u8; 32];
            for (i, chunk) in text.as_bytes().chunks(2).enumerate() {
                let hex = core::str::from_utf8(chunk).map_err(serde::de::Error::custom)?;
                bytes[i] = u8::from_str_radix(hex, 16).map_err(serde::de::Error::custom)?;
            }
            return Ok(Address(bytes));
        }
        Ok(Address::from_label(&text))
    }
}

/// Idealized asset ledger: atomic balance transfers with all-or-nothing
/// semantics. A failed transfer aborts the enclosing request; no partial
/// settlement is ever persisted.
pub trait AssetLedger {
    fn balance_of(&self, addr: Address) -> u64;

    /// Move `amount` from `from` to `to`. Fails with `InsufficientFunds`
    /// when `from` cannot cover the amount.
    fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), FeederError>;

    /// Authorize `spender` to pull up to `amount` from `owner`.
    fn approve(&mut self, owner: Address, spender: Address, amount: u64)
        -> Result<(), FeederError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance. Fails with `Unauthorized` when the allowance does not
    /// cover the amount.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), FeederError>;
}

/// The master pool: aggregate custodian of the base asset across feeder
/// pools and the source of truth for each feeder's pool value.
pub trait MasterPoolOracle {
    /// Ledger address holding the master pool's liquid balance.
    fn address(&self) -> Address;

    /// Handle of the base asset this master pool custodies.
    fn liquidity_asset(&self) -> Address;

    /// Pull `amount` from the feeder's ledger balance into the master pool,
    /// crediting the feeder's claim.
    fn deposit_feeder(
        &mut self,
        feeder: Address,
        amount: u64,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), FeederError>;

    /// Return `amount` of the feeder's claim to the feeder's ledger balance.
    /// Fails with `InsufficientFunds` when the master pool's liquid balance
    /// cannot cover it.
    fn withdraw_feeder(
        &mut self,
        feeder: Address,
        amount: u64,
        ledger: &mut dyn AssetLedger,
    ) -> Result<(), FeederError>;

    /// Current total value of the feeder's claim, as last settled.
    fn feeder_pool_value(&self, feeder: Address) -> u64;

    /// Current total value with any pending accrual settled first.
    fn feeder_pool_value_latest(&mut self, feeder: Address) -> u64;
}

/// Time-based reward emission checkpoint, fired before every unit mint or
/// burn. Opaque and infallible from the feeder pool's point of view.
pub trait RewardAccrualCheckpoint {
    /// Update the global accrual factor.
    fn checkpoint_global(&mut self);

    /// Update the per-depositor factor for the amount entering or leaving.
    fn checkpoint_depositor(&mut self, depositor: Address, amount: u64);
}

/// Enablement flags and the internal-bridge allow-list. Consulted, not
/// owned, by the feeder pool; `pool_active` is one-way true -> false.
pub trait AccessGate {
    fn deposits_enabled(&self) -> bool;
    fn withdrawals_enabled(&self) -> bool;
    fn pool_active(&self) -> bool;
    /// Internal-bridge addresses are exempt from the dev-share deduction.
    fn is_internal_bridge(&self, addr: Address) -> bool;
}
