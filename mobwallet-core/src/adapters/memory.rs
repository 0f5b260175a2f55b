//! In-memory wallet server for tests and offline experiments
//!
//! Simulates the parts of the wallet server the client relies on: an account
//! set, a ledger that grows one block per submitted transaction, and
//! per-account sync progress that advances a fixed number of blocks every
//! time a balance is requested. Balances can also be scripted to replay exact
//! server responses, and transport failures can be injected.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountSecrets, Balance, SecretEntropy, TransactionResult, Txo};
use crate::ports::WalletGateway;

#[derive(Debug, Clone)]
struct Credit {
    block_index: u64,
    value_pmob: u64,
    txo_id: String,
}

#[derive(Debug)]
struct LedgerAccount {
    account: Account,
    entropy: SecretEntropy,
    synced_block_index: u64,
    credits: Vec<Credit>,
    spent_pmob: u64,
    scripted: VecDeque<Balance>,
}

impl LedgerAccount {
    fn unspent_pmob(&self, up_to_block: u64) -> u64 {
        let received: u64 = self
            .credits
            .iter()
            .filter(|c| c.block_index <= up_to_block)
            .map(|c| c.value_pmob)
            .sum();
        received.saturating_sub(self.spent_pmob)
    }
}

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<String, LedgerAccount>,
    local_block_index: u64,
    offline: bool,
    next_seed: u8,
    next_txo: u64,
    unavailable_calls: u32,
    submit_failure: Option<String>,
    submit_count: u32,
    balance_calls: HashMap<String, u32>,
}

/// In-memory [`WalletGateway`]
#[derive(Debug)]
pub struct InMemoryWallet {
    state: Mutex<State>,
    /// Blocks an account catches up per balance request
    sync_step: u64,
}

impl InMemoryWallet {
    /// Ledger starting at `block_index`; accounts sync `sync_step` blocks per poll
    pub fn new(block_index: u64, sync_step: u64) -> Self {
        Self {
            state: Mutex::new(State {
                local_block_index: block_index,
                ..State::default()
            }),
            sync_step,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::unavailable(format!("Lock poisoned: {}", e)))
    }

    /// Report a zero network index, as a server started with `--offline` does
    pub fn set_offline(&self, offline: bool) -> Result<()> {
        self.lock()?.offline = offline;
        Ok(())
    }

    /// Add an account with a fixed id, funded with `unspent_pmob` at the current height
    pub fn insert_account(&self, account_id: &str, name: &str, unspent_pmob: u64) -> Result<Account> {
        let mut state = self.lock()?;
        let seed = state.next_seed;
        state.next_seed = state.next_seed.wrapping_add(1);
        let block = state.local_block_index;
        let txo_id = next_txo_id(&mut state);

        let account = Account {
            account_id: account_id.to_string(),
            name: name.to_string(),
            main_address: format!("addr-{}", account_id),
            first_block_index: Some(0),
        };
        let credits = if unspent_pmob > 0 {
            vec![Credit {
                block_index: block,
                value_pmob: unspent_pmob,
                txo_id,
            }]
        } else {
            Vec::new()
        };
        state.accounts.insert(
            account_id.to_string(),
            LedgerAccount {
                account: account.clone(),
                entropy: SecretEntropy::from_bytes([seed; 32]),
                synced_block_index: block,
                credits,
                spent_pmob: 0,
                scripted: VecDeque::new(),
            },
        );
        Ok(account)
    }

    /// Replay these balances, in order, for the next requests on `account_id`
    ///
    /// Once the script runs out the simulated ledger takes over again.
    pub fn script_balances(&self, account_id: &str, balances: Vec<Balance>) -> Result<()> {
        let mut state = self.lock()?;
        let entry = state
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| Error::remote(format!("Account not found: {}", account_id)))?;
        entry.scripted.extend(balances);
        Ok(())
    }

    /// Fail the next `calls` requests as if the server were unreachable
    pub fn fail_next_calls(&self, calls: u32) -> Result<()> {
        self.lock()?.unavailable_calls = calls;
        Ok(())
    }

    /// Reject the next submission with `message`
    pub fn fail_next_submit(&self, message: &str) -> Result<()> {
        self.lock()?.submit_failure = Some(message.to_string());
        Ok(())
    }

    /// Mine an empty block
    pub fn advance_chain(&self, blocks: u64) -> Result<()> {
        self.lock()?.local_block_index += blocks;
        Ok(())
    }

    pub fn block_index(&self) -> Result<u64> {
        Ok(self.lock()?.local_block_index)
    }

    pub fn submit_count(&self) -> Result<u32> {
        Ok(self.lock()?.submit_count)
    }

    pub fn balance_calls(&self, account_id: &str) -> Result<u32> {
        Ok(self.lock()?.balance_calls.get(account_id).copied().unwrap_or(0))
    }

    /// Common entry for every request: consume an injected outage if any
    fn enter(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        if state.unavailable_calls > 0 {
            state.unavailable_calls -= 1;
            return Err(Error::unavailable("connection refused"));
        }
        Ok(state)
    }
}

fn next_txo_id(state: &mut State) -> String {
    state.next_txo += 1;
    format!("txo{:06}", state.next_txo)
}

fn account_id_for(entropy: &SecretEntropy) -> String {
    let mixed: Vec<u8> = entropy
        .as_bytes()
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ 0xa5 ^ (i as u8).wrapping_mul(31))
        .collect();
    hex::encode(mixed)
}

fn not_found(account_id: &str) -> Error {
    Error::remote(format!("Account not found: {}", account_id))
}

impl InMemoryWallet {
    fn add_account(
        state: &mut State,
        entropy: SecretEntropy,
        name: Option<&str>,
        first_block_index: Option<u64>,
    ) -> Result<Account> {
        let account_id = account_id_for(&entropy);
        if state.accounts.contains_key(&account_id) {
            return Err(Error::remote(format!("Account already exists: {}", account_id)));
        }

        let first_block = first_block_index.unwrap_or(0);
        let account = Account {
            account_id: account_id.clone(),
            name: name.unwrap_or("").to_string(),
            main_address: format!("addr-{}", &account_id[..16]),
            first_block_index: Some(first_block),
        };
        state.accounts.insert(
            account_id,
            LedgerAccount {
                account: account.clone(),
                entropy,
                synced_block_index: first_block.min(state.local_block_index),
                credits: Vec::new(),
                spent_pmob: 0,
                scripted: VecDeque::new(),
            },
        );
        Ok(account)
    }
}

impl WalletGateway for InMemoryWallet {
    fn list_accounts(&self) -> Result<BTreeMap<String, Account>> {
        let state = self.enter()?;
        Ok(state
            .accounts
            .iter()
            .map(|(id, entry)| (id.clone(), entry.account.clone()))
            .collect())
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        let state = self.enter()?;
        state
            .accounts
            .get(account_id)
            .map(|entry| entry.account.clone())
            .ok_or_else(|| not_found(account_id))
    }

    fn create_account(&self, name: Option<&str>, first_block_index: Option<u64>) -> Result<Account> {
        let mut state = self.enter()?;
        let seed = state.next_seed;
        state.next_seed = state.next_seed.wrapping_add(1);
        let mut bytes = [0x5eu8; 32];
        bytes[0] = seed;
        bytes[31] = state.accounts.len() as u8;
        Self::add_account(&mut state, SecretEntropy::from_bytes(bytes), name, first_block_index)
    }

    fn import_account(
        &self,
        entropy: &SecretEntropy,
        name: Option<&str>,
        first_block_index: Option<u64>,
    ) -> Result<Account> {
        let mut state = self.enter()?;
        Self::add_account(&mut state, entropy.clone(), name, first_block_index)
    }

    fn export_account_secrets(&self, account_id: &str) -> Result<AccountSecrets> {
        let state = self.enter()?;
        let entry = state.accounts.get(account_id).ok_or_else(|| not_found(account_id))?;
        Ok(AccountSecrets {
            account_id: account_id.to_string(),
            entropy: entry.entropy.to_hex().to_string(),
            account_key: serde_json::json!({
                "object": "account_key",
                "view_private_key": format!("0a20{}", &account_id[..account_id.len().min(8)]),
                "spend_private_key": format!("0a20{}", &account_id[..account_id.len().min(8)]),
            }),
        })
    }

    fn update_account_name(&self, account_id: &str, name: &str) -> Result<Account> {
        let mut state = self.enter()?;
        let entry = state
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| not_found(account_id))?;
        entry.account.name = name.to_string();
        Ok(entry.account.clone())
    }

    fn remove_account(&self, account_id: &str) -> Result<bool> {
        let mut state = self.enter()?;
        Ok(state.accounts.remove(account_id).is_some())
    }

    fn get_balance(&self, account_id: &str) -> Result<Balance> {
        let mut state = self.enter()?;
        *state.balance_calls.entry(account_id.to_string()).or_insert(0) += 1;

        let local = state.local_block_index;
        let network = if state.offline { 0 } else { local };
        let step = self.sync_step;

        let entry = state
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| not_found(account_id))?;

        if let Some(scripted) = entry.scripted.pop_front() {
            return Ok(scripted);
        }

        entry.synced_block_index = (entry.synced_block_index + step).min(local);
        let synced = entry.synced_block_index;
        Ok(Balance {
            unspent_pmob: entry.unspent_pmob(synced),
            account_block_index: synced,
            network_block_index: network,
            local_block_index: local,
            is_synced: synced >= local,
        })
    }

    fn list_txos(&self, account_id: &str) -> Result<Vec<Txo>> {
        let state = self.enter()?;
        let entry = state.accounts.get(account_id).ok_or_else(|| not_found(account_id))?;
        Ok(entry
            .credits
            .iter()
            .filter(|c| c.block_index <= entry.synced_block_index)
            .map(|c| Txo {
                txo_id: c.txo_id.clone(),
                value_pmob: c.value_pmob,
                received_block_index: Some(c.block_index),
                spent_block_index: None,
                status: Some("unspent".to_string()),
            })
            .collect())
    }

    fn build_and_submit_transaction(
        &self,
        account_id: &str,
        value_pmob: u64,
        recipient_address: &str,
    ) -> Result<TransactionResult> {
        let mut state = self.enter()?;
        state.submit_count += 1;

        if let Some(message) = state.submit_failure.take() {
            return Err(Error::remote(message));
        }

        let submitted = state.local_block_index;
        let sender = state
            .accounts
            .get(account_id)
            .ok_or_else(|| not_found(account_id))?;
        if sender.unspent_pmob(sender.synced_block_index) < value_pmob {
            return Err(Error::remote("InsufficientFunds"));
        }

        // The transaction lands in the next block
        let block = submitted + 1;
        state.local_block_index = block;
        let txo_id = next_txo_id(&mut state);

        if let Some(sender) = state.accounts.get_mut(account_id) {
            sender.spent_pmob += value_pmob;
        }
        if let Some(recipient) = state
            .accounts
            .values_mut()
            .find(|a| a.account.main_address == recipient_address)
        {
            recipient.credits.push(Credit {
                block_index: block,
                value_pmob,
                txo_id,
            });
        }

        Ok(TransactionResult {
            transaction_log_id: Some(format!("log{:04}", state.submit_count)),
            submitted_block_index: submitted,
        })
    }
}
