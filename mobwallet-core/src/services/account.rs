//! Account service - resolve, create, import, export and remove accounts
//!
//! Accounts belong to the wallet server. Every lookup here goes back to the
//! server; nothing is cached between calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::result::{Error, Result};
use crate::domain::seed::{self, parse_hex_entropy};
use crate::domain::{Account, AccountSecrets, Balance, ExportRecord, SeedKind, Txo};
use crate::ports::WalletGateway;

/// An account together with a freshly fetched balance
#[derive(Debug, Clone, Serialize)]
pub struct AccountWithBalance {
    pub account: Account,
    pub balance: Balance,
}

/// Result of importing a seed
#[derive(Debug, Clone)]
pub struct ImportedAccount {
    pub account: Account,
    pub seed_kind: SeedKind,
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Removed(Account),
    Cancelled,
}

#[derive(Debug)]
pub enum ExportOutcome {
    Exported(ExportRecord),
    Cancelled,
}

/// Account operations against the wallet server
pub struct AccountService {
    gateway: Arc<dyn WalletGateway>,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn WalletGateway>) -> Self {
        Self { gateway }
    }

    /// Resolve an id prefix to exactly one account
    ///
    /// A full id is just a prefix that happens to match one account.
    pub fn resolve(&self, prefix: &str) -> Result<Account> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(Error::validation("Account id prefix must not be empty"));
        }

        let accounts = self.gateway.list_accounts()?;
        let mut matches: Vec<Account> = accounts
            .into_iter()
            .filter(|(id, _)| id.starts_with(prefix))
            .map(|(id, mut account)| {
                // Listings may omit the id inside the record
                if account.account_id.is_empty() {
                    account.account_id = id;
                }
                account
            })
            .collect();

        match matches.len() {
            0 => Err(Error::AccountNotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => {
                let mut ids: Vec<String> = matches.into_iter().map(|a| a.account_id).collect();
                ids.sort();
                Err(Error::AmbiguousAccount {
                    prefix: prefix.to_string(),
                    matches: ids,
                })
            }
        }
    }

    pub fn create(&self, name: Option<&str>, first_block_index: Option<u64>) -> Result<Account> {
        self.gateway.create_account(non_empty(name), first_block_index)
    }

    /// Import an account from hex entropy, a seed phrase or a recovery file
    ///
    /// An explicit `first_block_index` wins over the one stored in a
    /// recovery file.
    pub fn import(
        &self,
        seed_input: &str,
        name: Option<&str>,
        first_block_index: Option<u64>,
    ) -> Result<ImportedAccount> {
        let decoded = seed::decode(seed_input)?;
        let block = first_block_index.or(decoded.first_block_index);
        let account = self
            .gateway
            .import_account(&decoded.entropy, non_empty(name), block)?;
        Ok(ImportedAccount {
            account,
            seed_kind: decoded.kind,
        })
    }

    pub fn rename(&self, prefix: &str, name: &str) -> Result<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Account name must not be empty"));
        }
        let account = self.resolve(prefix)?;
        self.gateway.update_account_name(&account.account_id, name)
    }

    /// Remove an account from the wallet
    ///
    /// `confirm` is asked unless the account is fully synced and empty.
    pub fn delete<F>(&self, prefix: &str, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&Account, &Balance) -> bool,
    {
        let account = self.resolve(prefix)?;
        let balance = self.gateway.get_balance(&account.account_id)?;

        let nothing_to_lose = balance.is_caught_up() && balance.unspent_pmob == 0;
        if !nothing_to_lose && !confirm(&account, &balance) {
            return Ok(DeleteOutcome::Cancelled);
        }

        if !self.gateway.remove_account(&account.account_id)? {
            return Err(Error::remote(format!(
                "Server did not remove account {}",
                account.account_id
            )));
        }
        Ok(DeleteOutcome::Removed(account))
    }

    /// Build an export record for an account
    ///
    /// Secrets are only requested from the server after `confirm` approves.
    pub fn export<F>(&self, prefix: &str, confirm: F) -> Result<ExportOutcome>
    where
        F: FnOnce(&Account) -> bool,
    {
        let account = self.resolve(prefix)?;
        if !confirm(&account) {
            return Ok(ExportOutcome::Cancelled);
        }

        let AccountSecrets {
            entropy,
            account_key,
            ..
        } = self.gateway.export_account_secrets(&account.account_id)?;
        let entropy_hex = Zeroizing::new(entropy);
        let entropy = parse_hex_entropy(entropy_hex.trim())
            .ok_or_else(|| Error::remote("Server returned entropy that is not 32 bytes of hex"))?;

        let record = ExportRecord::build(&account, &entropy, account_key)?;
        Ok(ExportOutcome::Exported(record))
    }

    /// Write an export record, to its default file name inside `dir` unless
    /// `path` is given
    pub fn write_export(
        &self,
        record: &ExportRecord,
        path: Option<&Path>,
        dir: &Path,
    ) -> Result<PathBuf> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => dir.join(record.default_file_name()),
        };
        record.write_to(&target)?;
        Ok(target)
    }

    /// All accounts with current balances, ordered by id
    pub fn list(&self) -> Result<Vec<AccountWithBalance>> {
        let accounts = self.gateway.list_accounts()?;
        accounts
            .into_iter()
            .map(|(id, mut account)| {
                if account.account_id.is_empty() {
                    account.account_id = id;
                }
                let balance = self.gateway.get_balance(&account.account_id)?;
                Ok(AccountWithBalance { account, balance })
            })
            .collect()
    }

    pub fn balance(&self, prefix: &str) -> Result<AccountWithBalance> {
        let account = self.resolve(prefix)?;
        let balance = self.gateway.get_balance(&account.account_id)?;
        Ok(AccountWithBalance { account, balance })
    }

    /// Transaction outputs received by an account
    pub fn history(&self, prefix: &str) -> Result<(Account, Vec<Txo>)> {
        let account = self.resolve(prefix)?;
        let mut txos = self.gateway.list_txos(&account.account_id)?;
        txos.sort_by_key(|t| (t.received_block_index, t.spent_block_index));
        Ok((account, txos))
    }
}

fn non_empty(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWallet;

    fn service() -> (Arc<InMemoryWallet>, AccountService) {
        let wallet = Arc::new(InMemoryWallet::new(50, 100));
        let service = AccountService::new(wallet.clone());
        (wallet, service)
    }

    #[test]
    fn test_resolve_prefixes() {
        let (wallet, service) = service();
        wallet.insert_account("abc123", "A", 0).unwrap();
        wallet.insert_account("abcxyz", "B", 0).unwrap();

        match service.resolve("abc") {
            Err(Error::AmbiguousAccount { prefix, matches }) => {
                assert_eq!(prefix, "abc");
                assert_eq!(matches, vec!["abc123".to_string(), "abcxyz".to_string()]);
            }
            other => panic!("expected AmbiguousAccount, got {:?}", other),
        }
        assert_eq!(service.resolve("abc1").unwrap().name, "A");
        assert_eq!(service.resolve("abcxyz").unwrap().name, "B");
        assert!(matches!(service.resolve("zzz"), Err(Error::AccountNotFound(_))));
        assert!(matches!(service.resolve("  "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_resolve_is_never_cached() {
        let (wallet, service) = service();
        wallet.insert_account("abc123", "A", 0).unwrap();
        assert!(service.resolve("abc").is_ok());

        wallet.insert_account("abc999", "C", 0).unwrap();
        assert!(matches!(
            service.resolve("abc"),
            Err(Error::AmbiguousAccount { .. })
        ));
    }

    #[test]
    fn test_delete_empty_synced_account_skips_confirmation() {
        let (wallet, service) = service();
        wallet.insert_account("empty1", "Empty", 0).unwrap();

        let outcome = service
            .delete("empty", |_, _| panic!("confirmation should be skipped"))
            .unwrap();
        assert!(matches!(outcome, DeleteOutcome::Removed(_)));
        assert!(service.resolve("empty").is_err());
    }

    #[test]
    fn test_delete_funded_account_needs_confirmation() {
        let (wallet, service) = service();
        wallet.insert_account("rich01", "Rich", 5).unwrap();

        let outcome = service.delete("rich", |_, balance| {
            assert_eq!(balance.unspent_pmob, 5);
            false
        });
        assert!(matches!(outcome, Ok(DeleteOutcome::Cancelled)));
        assert!(service.resolve("rich").is_ok());
    }

    #[test]
    fn test_export_declined_never_fetches_secrets() {
        let (wallet, service) = service();
        wallet.insert_account("secret", "S", 0).unwrap();

        let outcome = service.export("sec", |_| false).unwrap();
        assert!(matches!(outcome, ExportOutcome::Cancelled));
    }

    #[test]
    fn test_rename_rejects_blank_name() {
        let (wallet, service) = service();
        wallet.insert_account("abc123", "A", 0).unwrap();
        assert!(matches!(service.rename("abc", " "), Err(Error::Validation(_))));
        assert_eq!(service.rename("abc", "Savings").unwrap().name, "Savings");
    }
}
