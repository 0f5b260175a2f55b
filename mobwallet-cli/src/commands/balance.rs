//! Show an account's balance

use anyhow::Result;

use mobwallet_core::domain::result::Result as CoreResult;
use mobwallet_core::services::AccountWithBalance;
use mobwallet_core::WalletContext;

use super::update_spinner;
use crate::output;

fn fetch(ctx: &WalletContext, account: &str, wait: bool, show_spinner: bool) -> CoreResult<AccountWithBalance> {
    let entry = ctx.account_service.balance(account)?;
    if !wait || entry.balance.is_caught_up() {
        return Ok(entry);
    }

    let spinner = if show_spinner {
        output::spinner("Waiting for the wallet server to sync")
    } else {
        None
    };
    let balance = ctx
        .sync_poller
        .wait_for_sync_with_progress(&entry.account.account_id, None, |progress| {
            update_spinner(&spinner, progress)
        });
    output::finish_spinner(spinner);

    Ok(AccountWithBalance {
        account: entry.account,
        balance: balance?,
    })
}

pub fn run(ctx: &WalletContext, account: &str, wait: bool, json: bool) -> Result<String> {
    let entry = fetch(ctx, account, wait, !json);

    if json {
        let account_id = entry.as_ref().map(|e| e.account.account_id.clone()).ok();
        output::print_json_result(entry.map(|entry| {
            serde_json::json!({
                "account": entry.account,
                "balance": entry.balance,
                "unspent_mob": entry.balance.unspent_mob().to_string(),
                "offline": entry.balance.is_offline(),
            })
        }))?;
        return Ok(account_id.unwrap_or_default());
    }

    let entry = entry?;
    output::print_account(&entry.account, Some(&entry.balance));
    Ok(entry.account.account_id)
}
