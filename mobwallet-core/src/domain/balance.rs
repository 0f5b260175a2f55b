//! Account balance and sync-progress snapshot

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::pmob_to_mob;
use super::wire::u64_from_str_or_num;

/// Balance of an account as reported by the wallet server
///
/// This is a point-in-time snapshot. It is never cached: every query goes
/// back to the server because sync progresses in the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub unspent_pmob: u64,
    /// Highest block processed for this account
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub account_block_index: u64,
    /// Highest block known to the network peers; zero when running offline
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub network_block_index: u64,
    /// Highest block in the local ledger database
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub local_block_index: u64,
    /// Server's own opinion on whether the account is synced
    #[serde(default)]
    pub is_synced: bool,
}

impl Balance {
    /// The server has no live chain source
    ///
    /// A zero network index means "no peers", never a real chain height.
    pub fn is_offline(&self) -> bool {
        self.network_block_index == 0
    }

    /// Block index the account must reach to be considered caught up
    pub fn chain_block_index(&self) -> u64 {
        if self.is_offline() {
            self.local_block_index
        } else {
            self.network_block_index
        }
    }

    /// Account has caught up with the chain height reported in this snapshot
    pub fn is_caught_up(&self) -> bool {
        self.account_block_index >= self.chain_block_index()
    }

    /// Account has processed at least `target`
    pub fn has_reached(&self, target: u64) -> bool {
        self.account_block_index >= target
    }

    pub fn unspent_mob(&self) -> Decimal {
        pmob_to_mob(self.unspent_pmob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn balance(account: u64, network: u64, local: u64) -> Balance {
        Balance {
            unspent_pmob: 0,
            account_block_index: account,
            network_block_index: network,
            local_block_index: local,
            is_synced: false,
        }
    }

    #[test]
    fn test_online_uses_network_index() {
        let b = balance(90, 100, 95);
        assert!(!b.is_offline());
        assert_eq!(b.chain_block_index(), 100);
        assert!(!b.is_caught_up());
        assert!(balance(100, 100, 95).is_caught_up());
    }

    #[test]
    fn test_offline_substitutes_local_index() {
        let b = balance(95, 0, 95);
        assert!(b.is_offline());
        assert_eq!(b.chain_block_index(), 95);
        assert!(b.is_caught_up());
        assert!(!balance(94, 0, 95).is_caught_up());
    }

    #[test]
    fn test_has_reached() {
        let b = balance(10, 10, 10);
        assert!(b.has_reached(10));
        assert!(!b.has_reached(11));
    }

    #[test]
    fn test_deserialize_server_payload() {
        let b: Balance = serde_json::from_value(serde_json::json!({
            "object": "balance",
            "unspent_pmob": "100000000000",
            "pending_pmob": "0",
            "spent_pmob": "0",
            "account_block_index": "152918",
            "network_block_index": "152918",
            "local_block_index": "152918",
            "is_synced": true,
        }))
        .unwrap();
        assert_eq!(b.unspent_mob(), Decimal::from_str("0.1").unwrap());
        assert!(b.is_caught_up());
        assert!(b.is_synced);
    }
}
