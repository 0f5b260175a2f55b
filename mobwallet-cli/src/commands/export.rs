//! Export an account's seed to a recovery file

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use mobwallet_core::services::ExportOutcome;
use mobwallet_core::WalletContext;

use super::confirm;
use crate::output;

/// Returns the exported account id, or None when cancelled
pub fn run(
    ctx: &WalletContext,
    account: &str,
    output_path: Option<&Path>,
    yes: bool,
) -> Result<Option<String>> {
    let mut answer = Ok(true);
    let outcome = ctx.account_service.export(account, |account| {
        println!("{}", "You are about to export the secret seed for:".yellow());
        let balance = ctx.gateway.get_balance(&account.account_id).ok();
        output::print_account(account, balance.as_ref());
        println!(
            "{}",
            "Anyone holding the exported file can spend this account's funds.".yellow()
        );
        answer = confirm("Write the seed phrase to a file?", yes);
        matches!(answer, Ok(true))
    })?;
    answer?;

    let record = match outcome {
        ExportOutcome::Exported(record) => record,
        ExportOutcome::Cancelled => {
            println!("Cancelled.");
            return Ok(None);
        }
    };

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let path = ctx
        .account_service
        .write_export(&record, output_path, &cwd)
        .context("Failed to write export file (it is never overwritten)")?;

    output::success(&format!("Wrote {}", path.display()));
    output::info("Store this file somewhere safe and offline.");
    Ok(Some(record.account_id.clone()))
}
