//! Shared in-memory store
//!
//! Holds the two mappings the pipeline fills and the API reads:
//! block number -> transaction envelope, and transaction hash -> receipt.
//! Both live behind one lock, so a reader of either mapping excludes
//! writers of both. Nothing is evicted.
//!
//! The lock is only ever taken for the in-memory step. Callers do their
//! network I/O before or after, never while holding it.

use crate::types::{Receipt, TransactionEnvelope};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    transactions: BTreeMap<String, TransactionEnvelope>,
    receipts: BTreeMap<String, Receipt>,
}

/// Transaction envelopes and receipts guarded by a single mutex.
#[derive(Debug, Default)]
pub struct SharedStore {
    tables: Mutex<Tables>,
}

impl SharedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dedup gate: claim `block_number` for fetching.
    ///
    /// If the block number is unknown, a placeholder envelope is inserted
    /// and `true` is returned; the caller now owns the fetch for it. If it
    /// is already known, nothing changes and `false` is returned. The check
    /// and the reservation happen in one critical section.
    pub fn admit(&self, block_number: &str) -> bool {
        let mut tables = self.tables.lock();
        if tables.transactions.contains_key(block_number) {
            debug!("Block {} already known, skipping", block_number);
            return false;
        }
        tables
            .transactions
            .insert(block_number.to_string(), TransactionEnvelope::default());
        true
    }

    /// Overwrite the envelope for an admitted block with fetched data.
    pub fn record_transaction(&self, block_number: &str, envelope: TransactionEnvelope) {
        self.tables
            .lock()
            .transactions
            .insert(block_number.to_string(), envelope);
    }

    /// Store a receipt under the transaction hash it carries.
    pub fn record_receipt(&self, receipt: Receipt) {
        let key = receipt.transaction_hash.clone();
        self.tables.lock().receipts.insert(key, receipt);
    }

    /// Get the envelope currently stored for a block, if admitted.
    pub fn transaction(&self, block_number: &str) -> Option<TransactionEnvelope> {
        self.tables.lock().transactions.get(block_number).cloned()
    }

    /// Get the receipt stored for a transaction hash.
    pub fn receipt(&self, tx_hash: &str) -> Option<Receipt> {
        self.tables.lock().receipts.get(tx_hash).cloned()
    }

    /// Every block number ever admitted, in key order.
    pub fn snapshot_keys(&self) -> Vec<String> {
        self.tables.lock().transactions.keys().cloned().collect()
    }

    /// Copy of the block number -> envelope mapping.
    pub fn snapshot_transactions(&self) -> BTreeMap<String, TransactionEnvelope> {
        self.tables.lock().transactions.clone()
    }

    /// Copy of the transaction hash -> receipt mapping.
    pub fn snapshot_receipts(&self) -> BTreeMap<String, Receipt> {
        self.tables.lock().receipts.clone()
    }

    /// Number of admitted blocks.
    pub fn len(&self) -> usize {
        self.tables.lock().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
