//! CLI command implementations

pub mod balance;
pub mod create;
pub mod delete;
pub mod export;
pub mod history;
pub mod import;
pub mod list;
pub mod logs;
pub mod rename;
pub mod send;
pub mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use mobwallet_core::config::Config;
use mobwallet_core::services::SyncProgress;
use mobwallet_core::{LogEvent, LoggingService, WalletContext};


/// Get the base directory from environment or default
pub fn get_base_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MOBILECOIN_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".mobilecoin"))
        .context("Could not find home directory (set MOBILECOIN_DIR)")
}

pub fn load_config() -> Result<Config> {
    let base_dir = get_base_dir()?;
    Config::load(&base_dir).context("Failed to load settings")
}

/// Connect to the wallet server for the configured network
pub fn get_context(config: Config, verbose: bool) -> Result<WalletContext> {
    WalletContext::new(config, verbose).context("Failed to initialize wallet client")
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(config: &Config) -> Option<LoggingService> {
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, config.network.as_str(), env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Ask a yes/no question; `assume_yes` answers for the user
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Show sync progress on the spinner, if there is one
pub fn update_spinner(spinner: &Option<indicatif::ProgressBar>, progress: &SyncProgress<'_>) {
    if let Some(pb) = spinner {
        pb.set_message(format!(
            "Syncing block {}/{}",
            progress.balance.account_block_index,
            progress.goal()
        ));
    }
}
