//! Submitted transaction result

use serde::{Deserialize, Serialize};

use super::wire::u64_from_str_or_num;

/// Outcome of a successful build-and-submit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    #[serde(default)]
    pub transaction_log_id: Option<String>,
    /// Ledger height when the transaction was handed to the network
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub submitted_block_index: u64,
}

impl TransactionResult {
    pub fn new(submitted_block_index: u64) -> Self {
        Self {
            transaction_log_id: None,
            submitted_block_index,
        }
    }

    /// First block that can contain the transaction
    ///
    /// The chain height seen right after submission does not include it yet,
    /// so confirmation waits for the next block.
    pub fn confirmation_block_index(&self) -> u64 {
        self.submitted_block_index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_target_is_next_block() {
        assert_eq!(TransactionResult::new(10).confirmation_block_index(), 11);
    }

    #[test]
    fn test_deserialize_transaction_log() {
        let result: TransactionResult = serde_json::from_value(serde_json::json!({
            "object": "transaction_log",
            "transaction_log_id": "ab12",
            "direction": "tx_direction_sent",
            "submitted_block_index": "152950",
        }))
        .unwrap();
        assert_eq!(result.submitted_block_index, 152950);
        assert_eq!(result.transaction_log_id.as_deref(), Some("ab12"));
    }
}
