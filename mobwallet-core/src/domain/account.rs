//! Account domain model

use serde::{Deserialize, Serialize};

use super::wire::{opt_u64_from_str_or_num, u64_from_str_or_num};

/// Number of id characters shown to users when referring to an account
pub const SHORT_ID_LEN: usize = 6;

/// An account held by the wallet server
///
/// The server owns accounts; the client only reads them and routes
/// rename/delete requests back through the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    pub main_address: String,
    /// Block at which the account started syncing
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub first_block_index: Option<u64>,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        name: impl Into<String>,
        main_address: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
            main_address: main_address.into(),
            first_block_index: None,
        }
    }

    /// Leading characters of the account id, used in listings and prompts
    pub fn short_id(&self) -> &str {
        short_id(&self.account_id)
    }
}

/// Leading characters of an account id
pub fn short_id(account_id: &str) -> &str {
    match account_id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &account_id[..idx],
        None => account_id,
    }
}

/// Secrets exported from the server for one account
#[derive(Clone, Deserialize)]
pub struct AccountSecrets {
    #[serde(default)]
    pub account_id: String,
    /// Root entropy, hex encoded
    pub entropy: String,
    /// Opaque key material (view/spend keys), passed through untouched
    pub account_key: serde_json::Value,
}

impl std::fmt::Debug for AccountSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSecrets")
            .field("account_id", &self.account_id)
            .field("entropy", &"<redacted>")
            .field("account_key", &"<redacted>")
            .finish()
    }
}

/// A transaction output owned by an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Txo {
    #[serde(alias = "txo_id_hex")]
    pub txo_id: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub value_pmob: u64,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub received_block_index: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub spent_block_index: Option<u64>,
    /// Server-reported status ("unspent", "pending", "spent", ...)
    #[serde(default, alias = "txo_status")]
    pub status: Option<String>,
}

impl Txo {
    pub fn is_spent(&self) -> bool {
        self.spent_block_index.is_some()
    }
}
