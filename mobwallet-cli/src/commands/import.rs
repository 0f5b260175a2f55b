//! Import an account from a seed

use anyhow::Result;

use mobwallet_core::domain::SeedKind;
use mobwallet_core::{Account, WalletContext};

use crate::output;

fn describe(kind: SeedKind) -> &'static str {
    match kind {
        SeedKind::HexEntropy => "hex entropy",
        SeedKind::Mnemonic => "seed phrase",
        SeedKind::RecoveryFile => "seed file",
    }
}

pub fn run(ctx: &WalletContext, seed: &str, name: Option<&str>, block: Option<u64>) -> Result<Account> {
    let imported = ctx.account_service.import(seed, name, block)?;
    output::success(&format!("Imported account from {}:", describe(imported.seed_kind)));

    let balance = ctx.gateway.get_balance(&imported.account.account_id).ok();
    output::print_account(&imported.account, balance.as_ref());
    if balance.map_or(false, |b| !b.is_caught_up()) {
        output::info("The wallet server is scanning the ledger for this account's history.");
    }
    Ok(imported.account)
}
