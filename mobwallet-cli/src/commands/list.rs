//! List all accounts with balances

use anyhow::Result;

use mobwallet_core::WalletContext;

use crate::output;

pub fn run(ctx: &WalletContext, json: bool) -> Result<()> {
    let accounts = ctx.account_service.list();

    if json {
        return output::print_json_result(accounts);
    }
    let accounts = accounts?;

    if accounts.is_empty() {
        output::warning("No accounts. Use 'mobilecoin create' or 'mobilecoin import' to add one.");
        return Ok(());
    }

    for (i, entry) in accounts.iter().enumerate() {
        if i > 0 {
            println!();
        }
        output::print_account(&entry.account, Some(&entry.balance));
    }
    Ok(())
}
