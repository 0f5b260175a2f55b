//! Sync poller - waits for the wallet server to catch an account up
//!
//! The server syncs the ledger in the background, so a balance is only
//! meaningful once the account has processed the blocks the caller cares
//! about. The poller re-fetches the balance until that happens or a bound
//! (attempt count or elapsed time) is exceeded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::SyncSettings;
use crate::domain::result::{Error, Result};
use crate::domain::Balance;
use crate::ports::WalletGateway;

/// Longest uninterrupted sleep; the cancel flag is checked in between
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Observed state after each successful balance fetch
#[derive(Debug)]
pub struct SyncProgress<'a> {
    pub attempt: u32,
    pub target: Option<u64>,
    pub balance: &'a Balance,
}

impl SyncProgress<'_> {
    /// Block index being waited for
    pub fn goal(&self) -> u64 {
        self.target
            .unwrap_or_else(|| self.balance.chain_block_index())
    }
}

/// Polls account balances until sync reaches a target block
pub struct SyncPoller {
    gateway: Arc<dyn WalletGateway>,
    settings: SyncSettings,
    cancel: Arc<AtomicBool>,
}

impl SyncPoller {
    pub fn new(gateway: Arc<dyn WalletGateway>, settings: SyncSettings) -> Self {
        Self {
            gateway,
            settings,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancel flag owned by the caller (e.g. a signal handler)
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that aborts a running wait when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Wait until the account is synced
    ///
    /// With a target, succeeds once the account has processed that block.
    /// Without one, succeeds once the account has caught up with the chain
    /// height reported in the same response (the local ledger when the
    /// server is offline).
    pub fn wait_for_sync(&self, account_id: &str, target: Option<u64>) -> Result<Balance> {
        self.wait_for_sync_with_progress(account_id, target, |_| {})
    }

    /// [`wait_for_sync`](Self::wait_for_sync), reporting every observed balance
    pub fn wait_for_sync_with_progress<F>(
        &self,
        account_id: &str,
        target: Option<u64>,
        mut on_progress: F,
    ) -> Result<Balance>
    where
        F: FnMut(&SyncProgress<'_>),
    {
        let started = Instant::now();
        let max_attempts = self.settings.max_attempts.max(1);
        let timeout = self.settings.timeout();

        let mut attempt = 0u32;
        let mut last_balance: Option<Balance> = None;
        let mut last_unavailable: Option<String> = None;

        loop {
            self.check_cancelled(account_id)?;
            attempt += 1;

            match self.gateway.get_balance(account_id) {
                Ok(balance) => {
                    on_progress(&SyncProgress {
                        attempt,
                        target,
                        balance: &balance,
                    });
                    let done = match target {
                        Some(t) => balance.has_reached(t),
                        None => balance.is_caught_up(),
                    };
                    if done {
                        return Ok(balance);
                    }
                    last_balance = Some(balance);
                }
                // The server may be restarting; count it as a failed attempt
                Err(Error::RemoteUnavailable(msg)) => last_unavailable = Some(msg),
                Err(e) => return Err(e),
            }

            if attempt >= max_attempts || started.elapsed() >= timeout {
                break;
            }
            self.sleep(account_id)?;
        }

        match (last_balance, last_unavailable) {
            (None, Some(msg)) => Err(Error::RemoteUnavailable(msg)),
            (last, _) => Err(Error::SyncTimeout {
                account_id: account_id.to_string(),
                target: target
                    .or_else(|| last.as_ref().map(|b| b.chain_block_index()))
                    .unwrap_or(0),
                last_synced: last.map(|b| b.account_block_index),
            }),
        }
    }

    fn check_cancelled(&self, account_id: &str) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(Error::Interrupted(account_id.to_string()));
        }
        Ok(())
    }

    fn sleep(&self, account_id: &str) -> Result<()> {
        let mut remaining = self.settings.poll_interval();
        while !remaining.is_zero() {
            self.check_cancelled(account_id)?;
            let step = remaining.min(CANCEL_CHECK_INTERVAL);
            thread::sleep(step);
            remaining -= step;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWallet;

    fn fast_settings(max_attempts: u32) -> SyncSettings {
        SyncSettings {
            poll_interval_ms: 1,
            max_attempts,
            timeout_secs: 30,
        }
    }

    fn balance(account: u64, network: u64, local: u64) -> Balance {
        Balance {
            unspent_pmob: 0,
            account_block_index: account,
            network_block_index: network,
            local_block_index: local,
            is_synced: false,
        }
    }

    fn setup(max_attempts: u32) -> (Arc<InMemoryWallet>, SyncPoller) {
        let wallet = Arc::new(InMemoryWallet::new(100, 1));
        wallet.insert_account("acct01", "Alice", 0).unwrap();
        let poller = SyncPoller::new(wallet.clone(), fast_settings(max_attempts));
        (wallet, poller)
    }

    #[test]
    fn test_target_not_reached_by_network_height() {
        let (wallet, poller) = setup(10);
        wallet
            .script_balances(
                "acct01",
                vec![balance(10, 10, 10), balance(10, 11, 11), balance(11, 11, 11)],
            )
            .unwrap();

        let result = poller.wait_for_sync("acct01", Some(11)).unwrap();
        assert_eq!(result.account_block_index, 11);
        assert_eq!(wallet.balance_calls("acct01").unwrap(), 3);
    }

    #[test]
    fn test_untargeted_uses_local_when_offline() {
        let (wallet, poller) = setup(10);
        wallet
            .script_balances("acct01", vec![balance(40, 0, 50), balance(50, 0, 50)])
            .unwrap();

        let result = poller.wait_for_sync("acct01", None).unwrap();
        assert!(result.is_offline());
        assert_eq!(result.account_block_index, 50);
    }

    #[test]
    fn test_timeout_reports_last_synced() {
        let (wallet, poller) = setup(3);
        wallet
            .script_balances(
                "acct01",
                vec![balance(5, 20, 20), balance(6, 20, 20), balance(7, 20, 20)],
            )
            .unwrap();

        match poller.wait_for_sync("acct01", Some(20)) {
            Err(Error::SyncTimeout {
                account_id,
                target,
                last_synced,
            }) => {
                assert_eq!(account_id, "acct01");
                assert_eq!(target, 20);
                assert_eq!(last_synced, Some(7));
            }
            other => panic!("expected SyncTimeout, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_throughout_surfaces_transport_error() {
        let (wallet, poller) = setup(3);
        wallet.fail_next_calls(3).unwrap();

        let result = poller.wait_for_sync("acct01", None);
        assert!(matches!(result, Err(Error::RemoteUnavailable(_))));
    }

    #[test]
    fn test_transient_outage_is_tolerated() {
        let (wallet, poller) = setup(5);
        wallet.fail_next_calls(2).unwrap();
        wallet
            .script_balances("acct01", vec![balance(100, 100, 100)])
            .unwrap();

        let result = poller.wait_for_sync("acct01", None).unwrap();
        assert_eq!(result.account_block_index, 100);
    }

    #[test]
    fn test_remote_error_aborts_immediately() {
        let (wallet, poller) = setup(5);
        let result = poller.wait_for_sync("missing", None);
        assert!(matches!(result, Err(Error::Remote(_))));
        assert_eq!(wallet.balance_calls("missing").unwrap(), 1);
    }

    #[test]
    fn test_cancel_flag_interrupts() {
        let (_wallet, poller) = setup(5);
        poller.cancel_flag().store(true, Ordering::SeqCst);

        let result = poller.wait_for_sync("acct01", Some(1_000));
        assert!(matches!(result, Err(Error::Interrupted(_))));
    }

    #[test]
    fn test_progress_reports_each_balance() {
        let (wallet, poller) = setup(10);
        wallet
            .script_balances("acct01", vec![balance(1, 3, 3), balance(3, 3, 3)])
            .unwrap();

        let mut seen = Vec::new();
        poller
            .wait_for_sync_with_progress("acct01", None, |p| {
                seen.push((p.attempt, p.balance.account_block_index, p.goal()))
            })
            .unwrap();
        assert_eq!(seen, vec![(1, 1, 3), (2, 3, 3)]);
    }
}
