//! Start and stop the local wallet server

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use mobwallet_core::services::{wait_until_reachable, ServerStart};
use mobwallet_core::WalletContext;

use crate::output;

pub fn start(ctx: &WalletContext, offline: bool, background: bool) -> Result<()> {
    let launcher = ctx.server_launcher();
    println!(
        "Starting {} wallet server{}",
        ctx.config.network.as_str().bold(),
        if offline { " (offline)" } else { "" }
    );

    match launcher.start(offline, background)? {
        ServerStart::Foreground(status) => {
            if !status.success() {
                anyhow::bail!("Wallet server exited with {}", status);
            }
        }
        ServerStart::Background { pid, log_path } => {
            println!("  pid {}, output in {}", pid, log_path.display());
            match wait_until_reachable(ctx.gateway.as_ref(), 8, Duration::from_millis(250)) {
                Ok(()) => output::success("Wallet server is up."),
                Err(e) => output::warning(&format!(
                    "Wallet server started but is not answering yet: {}",
                    e
                )),
            }
        }
    }
    Ok(())
}

pub fn stop(ctx: &WalletContext) -> Result<()> {
    if ctx.server_launcher().stop()? {
        output::success("Wallet server stopped.");
    } else {
        output::warning("No running wallet server found.");
    }
    Ok(())
}
