//! Wallet server port
//!
//! Defines the operations the client needs from the wallet server. The
//! services only depend on this trait, so tests can drive them with an
//! in-memory ledger and the CLI with the JSON-RPC adapter.

use std::collections::BTreeMap;

use crate::domain::result::Result;
use crate::domain::{Account, AccountSecrets, Balance, SecretEntropy, TransactionResult, Txo};

/// Remote wallet server
///
/// Implementations must map transport failures (connection refused,
/// timeouts) to `Error::RemoteUnavailable` and server-side rejections to
/// `Error::Remote`, so callers can tell "server down" from "request refused".
pub trait WalletGateway: Send + Sync {
    /// All accounts, keyed by account id
    fn list_accounts(&self) -> Result<BTreeMap<String, Account>>;

    fn get_account(&self, account_id: &str) -> Result<Account>;

    fn create_account(&self, name: Option<&str>, first_block_index: Option<u64>) -> Result<Account>;

    fn import_account(
        &self,
        entropy: &SecretEntropy,
        name: Option<&str>,
        first_block_index: Option<u64>,
    ) -> Result<Account>;

    fn export_account_secrets(&self, account_id: &str) -> Result<AccountSecrets>;

    fn update_account_name(&self, account_id: &str, name: &str) -> Result<Account>;

    /// Returns whether the server removed the account
    fn remove_account(&self, account_id: &str) -> Result<bool>;

    fn get_balance(&self, account_id: &str) -> Result<Balance>;

    fn list_txos(&self, account_id: &str) -> Result<Vec<Txo>>;

    /// Build, sign and submit a payment of `value_pmob` picoMOB
    ///
    /// Not idempotent: calling twice may pay twice.
    fn build_and_submit_transaction(
        &self,
        account_id: &str,
        value_pmob: u64,
        recipient_address: &str,
    ) -> Result<TransactionResult>;
}
