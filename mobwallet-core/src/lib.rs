//! MobWallet Core - wallet logic for the MobileCoin command-line client
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: seeds, amounts, accounts, balances and errors
//! - **ports**: the [`WalletGateway`](ports::WalletGateway) trait for the wallet server
//! - **services**: account management, sync polling, payments, event log, server launcher
//! - **adapters**: the full-service JSON-RPC client and an in-memory wallet

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use adapters::full_service::FullServiceClient;
use config::Config;
use ports::WalletGateway;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{Account, Balance, ExportRecord, SecretEntropy, TransactionResult, Txo};
pub use services::{LogEvent, LoggingService};

/// Main context for wallet operations
///
/// Holds the configuration, the wallet server connection and the services
/// built on top of it.
pub struct WalletContext {
    pub config: Config,
    pub gateway: Arc<dyn WalletGateway>,
    pub account_service: AccountService,
    pub sync_poller: Arc<SyncPoller>,
    pub transaction_service: TransactionService,
}

impl WalletContext {
    /// Connect to the wallet server named in the configuration
    pub fn new(config: Config, verbose: bool) -> Result<Self> {
        let client = FullServiceClient::new(&config.rpc_url)?.with_verbose(verbose);
        Ok(Self::with_gateway(config, Arc::new(client)))
    }

    /// Build the services on top of any gateway
    pub fn with_gateway(config: Config, gateway: Arc<dyn WalletGateway>) -> Self {
        let sync_poller = Arc::new(SyncPoller::new(Arc::clone(&gateway), config.sync.clone()));
        let account_service = AccountService::new(Arc::clone(&gateway));
        let transaction_service =
            TransactionService::new(Arc::clone(&gateway), Arc::clone(&sync_poller));

        Self {
            config,
            gateway,
            account_service,
            sync_poller,
            transaction_service,
        }
    }

    /// Flag that interrupts any sync wait in progress
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.sync_poller.cancel_flag()
    }

    pub fn server_launcher(&self) -> ServerLauncher {
        ServerLauncher::new(self.config.clone())
    }
}
