//! Send MOB from one account to another account or address

use anyhow::Result;
use colored::Colorize;

use mobwallet_core::domain::amount::parse_mob;
use mobwallet_core::services::SendOutcome;
use mobwallet_core::{Account, Error, WalletContext};

use super::{confirm, update_spinner};
use crate::output;

/// Recipient given as an account id prefix or a raw address
fn resolve_recipient(ctx: &WalletContext, to: &str) -> Result<(String, Option<Account>)> {
    match ctx.account_service.resolve(to) {
        Ok(account) => Ok((account.main_address.clone(), Some(account))),
        Err(Error::AccountNotFound(_)) => Ok((to.trim().to_string(), None)),
        Err(e) => Err(e.into()),
    }
}

/// Returns the sender's account id
pub fn run(
    ctx: &WalletContext,
    from: &str,
    amount: &str,
    to: &str,
    yes: bool,
    no_wait: bool,
) -> Result<String> {
    let amount = parse_mob(amount)?;
    let sender = ctx.account_service.resolve(from)?;
    let (to_address, recipient) = resolve_recipient(ctx, to)?;

    let mut answer = Ok(true);
    let mut ask = |preview: &mobwallet_core::services::PaymentPreview| {
        let to_label = match &recipient {
            Some(account) => format!("{} {}", account.short_id(), account.name),
            None => preview.to_address.clone(),
        };
        println!(
            "Send {} from {} {} to {}",
            output::format_mob(preview.amount).bold(),
            sender.short_id(),
            sender.name,
            to_label
        );
        answer = confirm("Submit this transaction?", yes);
        matches!(answer, Ok(true))
    };

    let outcome = if no_wait {
        ctx.transaction_service
            .submit(&sender.account_id, amount, &to_address, ask)?
    } else {
        let spinner = std::cell::RefCell::new(None);
        let result = ctx.transaction_service.send_and_confirm_with_progress(
            &sender.account_id,
            amount,
            &to_address,
            |preview| {
                let approved = ask(preview);
                if approved {
                    *spinner.borrow_mut() = output::spinner("Waiting for the transaction to land");
                }
                approved
            },
            |progress| update_spinner(&spinner.borrow(), progress),
        );
        output::finish_spinner(spinner.into_inner());
        result?
    };
    answer?;

    match outcome {
        SendOutcome::Cancelled => {
            println!("Cancelled.");
        }
        SendOutcome::Sent { result, balance } => {
            output::success(&format!(
                "Submitted at block {}",
                result.submitted_block_index
            ));
            match balance {
                Some(balance) => {
                    println!("Sender:");
                    output::print_account(&sender, Some(&balance));
                    if let Some(recipient) = &recipient {
                        let spinner = output::spinner("Waiting for the recipient to see the payment");
                        let received = ctx.transaction_service.confirm_receipt_with_progress(
                            &recipient.account_id,
                            &result,
                            |progress| update_spinner(&spinner, progress),
                        );
                        output::finish_spinner(spinner);
                        let received = received?;
                        println!("Recipient:");
                        output::print_account(recipient, Some(&received));
                    }
                }
                None => output::info(&format!(
                    "Not waiting for confirmation; it lands in block {} or later.",
                    result.confirmation_block_index()
                )),
            }
        }
    }
    Ok(sender.account_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mobwallet_core::adapters::memory::InMemoryWallet;
    use mobwallet_core::config::{Config, SyncSettings};
    use mobwallet_core::ports::WalletGateway;

    const ONE_MOB: u64 = 1_000_000_000_000;

    fn context() -> (Arc<InMemoryWallet>, WalletContext) {
        let wallet = Arc::new(InMemoryWallet::new(10, 1));
        wallet.insert_account("aaaa1111", "Alice", 5 * ONE_MOB).unwrap();
        wallet.insert_account("bbbb2222", "Bob", 0).unwrap();

        let mut config = Config::with_base_dir(&std::env::temp_dir());
        config.sync = SyncSettings {
            poll_interval_ms: 1,
            max_attempts: 20,
            timeout_secs: 30,
        };
        (wallet.clone(), WalletContext::with_gateway(config, wallet))
    }

    #[test]
    fn test_send_to_local_account_waits_for_both_sides() {
        let (wallet, ctx) = context();

        let sender = run(&ctx, "aaaa", "1.5", "bbbb", true, false).unwrap();

        assert_eq!(sender, "aaaa1111");
        assert_eq!(wallet.submit_count().unwrap(), 1);
        let bob = wallet.get_balance("bbbb2222").unwrap();
        assert_eq!(bob.unspent_pmob, 1_500_000_000_000);
        assert_eq!(bob.account_block_index, 11);
    }

    #[test]
    fn test_send_to_raw_address_without_waiting() {
        let (wallet, ctx) = context();

        run(&ctx, "aaaa", "2", "addr-bbbb2222", true, true).unwrap();

        assert_eq!(wallet.submit_count().unwrap(), 1);
        assert_eq!(wallet.block_index().unwrap(), 11);
    }

    #[test]
    fn test_send_rejects_bad_amount_before_submitting() {
        let (wallet, ctx) = context();

        assert!(run(&ctx, "aaaa", "-1", "bbbb", true, false).is_err());
        assert!(run(&ctx, "aaaa", "lots", "bbbb", true, false).is_err());
        assert_eq!(wallet.submit_count().unwrap(), 0);
    }
}
