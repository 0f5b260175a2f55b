//! Rename an account

use anyhow::Result;

use mobwallet_core::{Account, WalletContext};

use crate::output;

pub fn run(ctx: &WalletContext, account: &str, name: &str) -> Result<Account> {
    let renamed = ctx.account_service.rename(account, name)?;
    output::success(&format!("Renamed account {} to \"{}\"", renamed.short_id(), renamed.name));
    Ok(renamed)
}
