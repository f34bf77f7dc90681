//! Ethereum JSON-RPC types
//!
//! Type definitions for blocks, transactions, and receipts returned from
//! Ethereum JSON-RPC endpoints. Quantities are kept as the hex strings the
//! node sends; nothing here parses them into numbers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reference to a chain block, as returned by `eth_getBlockByNumber`.
///
/// Only the identifying fields are kept. Anything else in the block
/// payload (transactions included) is ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block number (hex string, e.g. `0xd260eb`)
    #[serde(rename = "number", default, deserialize_with = "deserialize_nullable_string")]
    pub number: String,

    /// Block hash
    #[serde(rename = "hash", default, deserialize_with = "deserialize_nullable_string")]
    pub hash: String,

    /// Hash of the parent block
    #[serde(rename = "parentHash", default, deserialize_with = "deserialize_nullable_string")]
    pub parent_hash: String,
}

/// Ethereum transaction with every field kept as an opaque string.
///
/// Fields the node leaves out or sends as `null` (such as `to` on a
/// contract creation) decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "blockHash", deserialize_with = "deserialize_nullable_string")]
    pub block_hash: String,
    #[serde(rename = "blockNumber", deserialize_with = "deserialize_nullable_string")]
    pub block_number: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub gas: String,
    #[serde(rename = "gasPrice", deserialize_with = "deserialize_nullable_string")]
    pub gas_price: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub hash: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub input: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub nonce: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub r: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub s: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub to: String,
    #[serde(rename = "transactionIndex", deserialize_with = "deserialize_nullable_string")]
    pub transaction_index: String,
    #[serde(rename = "type", deserialize_with = "deserialize_nullable_string")]
    pub tx_type: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub v: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub value: String,
}

impl Transaction {
    /// A block with no transaction at the requested index yields an empty
    /// transaction, recognisable by its missing hash.
    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }
}

/// JSON-RPC response wrapper for `eth_getTransactionByBlockNumberAndIndex`.
///
/// `TransactionEnvelope::default()` is the placeholder the dedup gate
/// stores when it claims a block number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// Protocol version (`"2.0"`)
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub jsonrpc: String,

    /// Request id echoed by the node
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub id: u64,

    /// The transaction payload (`null` when the block has none)
    #[serde(rename = "result", default, deserialize_with = "deserialize_null_as_default")]
    pub transaction: Transaction,
}

impl TransactionEnvelope {
    /// Whether this is still the placeholder written at admission.
    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }
}

/// Transaction receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    /// Hash of the transaction this receipt belongs to; the store key.
    #[serde(rename = "transactionHash", deserialize_with = "deserialize_nullable_string")]
    pub transaction_hash: String,
    #[serde(rename = "transactionIndex", deserialize_with = "deserialize_nullable_string")]
    pub transaction_index: String,
    #[serde(rename = "blockHash", deserialize_with = "deserialize_nullable_string")]
    pub block_hash: String,
    #[serde(rename = "blockNumber", deserialize_with = "deserialize_nullable_string")]
    pub block_number: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub to: String,
    #[serde(rename = "gasUsed", deserialize_with = "deserialize_nullable_string")]
    pub gas_used: String,
    #[serde(rename = "cumulativeGasUsed", deserialize_with = "deserialize_nullable_string")]
    pub cumulative_gas_used: String,
    #[serde(rename = "effectiveGasPrice", deserialize_with = "deserialize_nullable_string")]
    pub effective_gas_price: String,
    /// Address of the created contract, empty for plain calls
    #[serde(rename = "contractAddress", deserialize_with = "deserialize_nullable_string")]
    pub contract_address: String,
    /// `0x1` on success, `0x0` on failure
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub status: String,
    #[serde(rename = "type", deserialize_with = "deserialize_nullable_string")]
    pub tx_type: String,
    #[serde(rename = "logsBloom", deserialize_with = "deserialize_nullable_string")]
    pub logs_bloom: String,
    /// Raw log entries, passed through untouched
    pub logs: Vec<Value>,
}

// Deserialization helpers

/// Deserialize a string that may be `null`, mapping `null` to `""`.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a value that may be `null`, mapping `null` to `T::default()`.
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
