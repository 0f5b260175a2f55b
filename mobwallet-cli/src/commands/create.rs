//! Create a new account

use anyhow::Result;

use mobwallet_core::{Account, WalletContext};

use crate::output;

pub fn run(ctx: &WalletContext, name: Option<&str>, block: Option<u64>) -> Result<Account> {
    let account = ctx.account_service.create(name, block)?;
    output::success("Created account:");
    let balance = ctx.gateway.get_balance(&account.account_id).ok();
    output::print_account(&account, balance.as_ref());
    Ok(account)
}
