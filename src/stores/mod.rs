//! Storage layer for the business-operations core. Provides storage for:
//! - One-time codes per subject and flow ([`OtpLedger`])
//! - Personal and business wallet balances ([`WalletLedger`])
//! - Transfer history ([`TransferStore`])
//!
//! Every store sits on top of a [`Repository`], so the workflow logic in
//! `engine.rs` doesn't care where records live. The only implementation
//! shipped is [`MemoryRepository`], which keeps everything in process
//! memory for synchronous, direct access.

mod otp;
mod transfers;
mod wallets;

use std::collections::HashMap;
use std::hash::Hash;

pub use otp::{OtpEntry, OtpLedger, OtpPolicy};
pub use transfers::{Transfer, TransferKind, TransferQuery, TransferStatus, TransferStore};
pub use wallets::{
    AccountNumber, VirtualAccountOutcome, Wallet, WalletInfo, WalletLedger, WalletSettings,
    WalletType,
};

/// Keyed record storage. Values are returned by copy so that a durable
/// backend can implement the same interface.
pub trait Repository<K, V> {
    fn get(&self, key: &K) -> Option<V>;

    /// Inserts or replaces the record stored under `key`.
    fn put(&mut self, key: K, value: V);

    /// Removes and returns the record stored under `key`.
    fn delete(&mut self, key: &K) -> Option<V>;

    fn values(&self) -> Vec<V>;

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryRepository<K, V> {
    records: HashMap<K, V>,
}

impl<K, V> Default for MemoryRepository<K, V> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<K, V> MemoryRepository<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> Repository<K, V> for MemoryRepository<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.records.get(key).cloned()
    }

    fn put(&mut self, key: K, value: V) {
        self.records.insert(key, value);
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        self.records.remove(key)
    }

    fn values(&self) -> Vec<V> {
        self.records.values().cloned().collect()
    }

    fn contains(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }
}
