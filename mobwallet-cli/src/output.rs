//! Output formatting utilities

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;

use mobwallet_core::domain::amount::pmob_to_mob;
use mobwallet_core::domain::result::Result as CoreResult;
use mobwallet_core::{Account, Balance, Error, OperationResult};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// MOB with four decimal places
pub fn format_mob(mob: Decimal) -> String {
    format!("{:.4} MOB", mob)
}

pub fn format_pmob(pmob: u64) -> String {
    format_mob(pmob_to_mob(pmob))
}

/// Account summary: short id and name, address, balance and sync state
pub fn print_account(account: &Account, balance: Option<&Balance>) {
    println!("{} {}", account.short_id().bold(), account.name);
    println!("  address {}", account.main_address);
    if let Some(balance) = balance {
        let mut line = format!(
            "  {} ({}/{} blocks synced)",
            format_mob(balance.unspent_mob()),
            balance.account_block_index,
            balance.chain_block_index()
        );
        if balance.is_offline() {
            line.push_str(" [offline]");
        }
        println!("{}", line);
    }
}

/// Render a command result as an `OperationResult` document
///
/// The error, if any, is handed back so the caller can still fail.
pub fn json_result<T: Serialize>(result: CoreResult<T>) -> Result<(String, Option<Error>)> {
    match result {
        Ok(data) => Ok((serde_json::to_string_pretty(&OperationResult::ok(data))?, None)),
        Err(e) => {
            let document = serde_json::to_string_pretty(&OperationResult::<()>::from_error(&e))?;
            Ok((document, Some(e)))
        }
    }
}

/// Print a `--json` result; failures are printed too, then returned
pub fn print_json_result<T: Serialize>(result: CoreResult<T>) -> Result<()> {
    let (document, error) = json_result(result)?;
    println!("{}", document);
    match error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Spinner on stdout when it is a terminal
pub fn spinner(message: &str) -> Option<ProgressBar> {
    if atty::isnt(atty::Stream::Stdout) {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

pub fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_mob_rounds_to_four_places() {
        assert_eq!(format_mob(Decimal::from_str("0.1").unwrap()), "0.1000 MOB");
        assert_eq!(format_pmob(1_234_567_000_000), "1.2346 MOB");
        assert_eq!(format_pmob(0), "0.0000 MOB");
    }

    #[test]
    fn test_json_result_on_success() {
        let (document, error) = json_result(Ok(vec!["abc123"])).unwrap();
        assert!(error.is_none());
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], serde_json::json!(["abc123"]));
    }

    #[test]
    fn test_json_result_lists_ambiguous_matches() {
        let result: CoreResult<u64> = Err(Error::AmbiguousAccount {
            prefix: "ab".to_string(),
            matches: vec!["ab12".to_string(), "ab34".to_string()],
        });
        let (document, error) = json_result(result).unwrap();

        assert!(matches!(error, Some(Error::AmbiguousAccount { .. })));
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["data"].is_null());
        assert_eq!(value["context"]["matches"], serde_json::json!(["ab12", "ab34"]));
    }
}
