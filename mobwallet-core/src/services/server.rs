//! Wallet server launcher - start and stop the full-service process
//!
//! The client never embeds the server; it runs the network's
//! `full-service` binary against databases in the data directory.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::domain::result::Error;
use crate::ports::WalletGateway;

/// How the server was started
#[derive(Debug)]
pub enum ServerStart {
    /// Ran in the foreground until it exited
    Foreground(ExitStatus),
    /// Detached; output goes to the server log file
    Background { pid: u32, log_path: std::path::PathBuf },
}

/// Builds and runs wallet server invocations for the configured network
pub struct ServerLauncher {
    config: Config,
}

impl ServerLauncher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Arguments passed to the server binary
    pub fn args(&self, offline: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--wallet-db".into(),
            self.config.wallet_db_path().into_os_string(),
            "--ledger-db".into(),
            self.config.ledger_db_path().into_os_string(),
        ];

        if offline {
            args.push("--offline".into());
        } else {
            let network = self.config.network;
            for peer in network.peers() {
                args.push("--peer".into());
                args.push((*peer).into());
            }
            for url in network.tx_source_urls() {
                args.push("--tx-source-url".into());
                args.push((*url).into());
            }
        }
        args
    }

    /// Server command with environment set, not yet spawned
    pub fn command(&self, offline: bool) -> Command {
        let mut command = Command::new(self.config.server_binary());
        command
            .args(self.args(offline))
            .env("RUST_LOG", "info")
            .env("mc_ledger_sync", "info");
        command
    }

    /// Start the server, creating its database directories first
    pub fn start(&self, offline: bool, background: bool) -> Result<ServerStart> {
        let binary = self.config.server_binary();
        if !binary.exists() {
            bail!(
                "Wallet server binary not found at {} (set server.binaryDir in settings.json)",
                binary.display()
            );
        }

        if let Some(wallet_dir) = self.config.wallet_db_path().parent() {
            fs::create_dir_all(wallet_dir)
                .with_context(|| format!("Failed to create {}", wallet_dir.display()))?;
        }
        let ledger_dir = self.config.ledger_db_path();
        fs::create_dir_all(&ledger_dir)
            .with_context(|| format!("Failed to create {}", ledger_dir.display()))?;

        let mut command = self.command(offline);

        if !background {
            let status = command
                .status()
                .with_context(|| format!("Failed to run {}", binary.display()))?;
            return Ok(ServerStart::Foreground(status));
        }

        let log_path = self.config.server_log_path();
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;
        let log_err = log.try_clone()?;

        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()
            .with_context(|| format!("Failed to start {}", binary.display()))?;

        Ok(ServerStart::Background {
            pid: child.id(),
            log_path,
        })
    }

    /// Stop every running server process for this network
    ///
    /// Returns false when no process was found.
    pub fn stop(&self) -> Result<bool> {
        let status = Command::new("killall")
            .arg("-v")
            .arg(self.config.network.binary_name())
            .status()
            .context("Failed to run killall")?;
        Ok(status.success())
    }
}

/// Block until the server answers, retrying with exponential backoff
pub fn wait_until_reachable(
    gateway: &dyn WalletGateway,
    attempts: u32,
    initial_delay: Duration,
) -> crate::domain::result::Result<()> {
    let mut delay = initial_delay;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match gateway.list_accounts() {
            Ok(_) => return Ok(()),
            Err(Error::RemoteUnavailable(_)) if attempt < attempts => {
                thread::sleep(delay);
                delay = delay.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}
