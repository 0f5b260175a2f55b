//! Show the transaction outputs of an account

use anyhow::Result;
use colored::Colorize;

use mobwallet_core::WalletContext;

use crate::output;

pub fn run(ctx: &WalletContext, account: &str, json: bool) -> Result<String> {
    let history = ctx.account_service.history(account);

    if json {
        let account_id = history.as_ref().map(|(a, _)| a.account_id.clone()).ok();
        output::print_json_result(history.map(|(_, txos)| txos))?;
        return Ok(account_id.unwrap_or_default());
    }
    let (account, txos) = history?;

    output::print_account(&account, None);
    if txos.is_empty() {
        println!("  No transactions yet.");
        return Ok(account.account_id);
    }

    let mut table = output::create_table();
    table.set_header(vec!["Txo", "Amount", "Received", "Spent", "Status"]);
    for txo in &txos {
        let id: String = txo.txo_id.chars().take(12).collect();
        let spent = match txo.spent_block_index {
            Some(block) => block.to_string().red().to_string(),
            None => String::new(),
        };
        table.add_row(vec![
            id,
            output::format_pmob(txo.value_pmob),
            txo.received_block_index
                .map(|b| b.to_string())
                .unwrap_or_default(),
            spent,
            txo.status.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
    Ok(account.account_id)
}
