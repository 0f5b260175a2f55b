//! Remove an account from the wallet

use anyhow::Result;
use colored::Colorize;

use mobwallet_core::services::DeleteOutcome;
use mobwallet_core::WalletContext;

use super::confirm;
use crate::output;

/// Returns the removed account id, or None when cancelled
pub fn run(ctx: &WalletContext, account: &str, yes: bool) -> Result<Option<String>> {
    let mut answer = Ok(true);
    let outcome = ctx.account_service.delete(account, |account, balance| {
        println!("{}", "You are about to remove:".yellow());
        output::print_account(account, Some(balance));
        println!(
            "{}",
            "Without an exported seed, any funds in this account will be lost.".yellow()
        );
        answer = confirm("Remove this account?", yes);
        matches!(answer, Ok(true))
    })?;
    answer?;

    match outcome {
        DeleteOutcome::Removed(account) => {
            output::success(&format!(
                "Removed account {} {}",
                account.short_id(),
                account.name
            ));
            Ok(Some(account.account_id))
        }
        DeleteOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(None)
        }
    }
}
