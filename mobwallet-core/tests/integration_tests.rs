//! Integration tests for mobwallet-core services
//!
//! The wallet server is replaced by the in-memory wallet; seed decoding,
//! export files, prefix resolution, sync polling and payments run for real.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::str::FromStr;
use std::sync::Arc;

use rand::RngCore;
use rust_decimal::Decimal;
use tempfile::TempDir;

use mobwallet_core::adapters::memory::InMemoryWallet;
use mobwallet_core::config::{Config, SyncSettings};
use mobwallet_core::domain::seed::{self, SeedKind};
use mobwallet_core::services::{DeleteOutcome, ExportOutcome, SendOutcome};
use mobwallet_core::{Error, SecretEntropy, WalletContext};

// ============================================================================
// Test Helpers
// ============================================================================

const ONE_MOB: u64 = 1_000_000_000_000;

fn fast_sync() -> SyncSettings {
    SyncSettings {
        poll_interval_ms: 1,
        max_attempts: 50,
        timeout_secs: 30,
    }
}

/// Wallet context over an in-memory server at `block_index`
fn create_context(temp_dir: &TempDir, block_index: u64) -> (Arc<InMemoryWallet>, WalletContext) {
    let mut config = Config::with_base_dir(temp_dir.path());
    config.sync = fast_sync();
    let wallet = Arc::new(InMemoryWallet::new(block_index, 2));
    let context = WalletContext::with_gateway(config, wallet.clone());
    (wallet, context)
}

fn random_entropy() -> SecretEntropy {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    SecretEntropy::from_bytes(bytes)
}

// ============================================================================
// Seed import / export
// ============================================================================

#[test]
fn test_mnemonic_round_trip_for_random_secrets() {
    for _ in 0..20 {
        let entropy = random_entropy();
        let phrase = seed::encode(&entropy).unwrap();
        let decoded = seed::decode(&phrase).unwrap();
        assert_eq!(decoded.entropy, entropy);
        assert_eq!(decoded.kind, SeedKind::Mnemonic);
        assert_eq!(decoded.first_block_index, None);
    }
}

#[test]
fn test_import_each_seed_form_yields_same_account() {
    let temp_dir = TempDir::new().unwrap();
    let entropy = random_entropy();
    let hex = entropy.to_hex();
    let phrase = seed::encode(&entropy).unwrap();

    let (_wallet, context) = create_context(&temp_dir, 100);
    let by_hex = context.account_service.import(&hex, Some("Hex"), None).unwrap();
    assert_eq!(by_hex.seed_kind, SeedKind::HexEntropy);

    let (_wallet, context) = create_context(&temp_dir, 100);
    let by_phrase = context
        .account_service
        .import(&phrase.to_uppercase(), None, None)
        .unwrap();
    assert_eq!(by_phrase.seed_kind, SeedKind::Mnemonic);

    assert_eq!(by_hex.account.account_id, by_phrase.account.account_id);
}

#[test]
fn test_export_file_reimports_with_first_block() {
    let temp_dir = TempDir::new().unwrap();
    let (_wallet, context) = create_context(&temp_dir, 500);
    let entropy = random_entropy();

    let imported = context
        .account_service
        .import(&entropy.to_hex(), Some("Savings"), Some(420))
        .unwrap();
    let account_id = imported.account.account_id.clone();

    let outcome = context
        .account_service
        .export(&account_id[..8], |account| {
            assert_eq!(account.name, "Savings");
            true
        })
        .unwrap();
    let ExportOutcome::Exported(record) = outcome else {
        panic!("expected export");
    };
    assert_eq!(record.first_block_index, 420);
    assert_eq!(record.account_name, "Savings");

    let path = context
        .account_service
        .write_export(&record, None, temp_dir.path())
        .unwrap();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!("mobilecoin_seed_phrase_{}.json", &account_id[..16])
    );
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.ends_with("}\n"));
    assert!(content.contains("\n    \"seed_phrase\""));

    // Never overwrite an existing export
    assert!(context
        .account_service
        .write_export(&record, Some(&path), temp_dir.path())
        .is_err());

    // The file is itself a valid seed
    let decoded = seed::decode(path.to_str().unwrap()).unwrap();
    assert_eq!(decoded.kind, SeedKind::RecoveryFile);
    assert_eq!(decoded.entropy, entropy);
    assert_eq!(decoded.first_block_index, Some(420));

    let (_wallet, fresh) = create_context(&temp_dir, 500);
    let restored = fresh
        .account_service
        .import(path.to_str().unwrap(), None, None)
        .unwrap();
    assert_eq!(restored.account.account_id, account_id);
    assert_eq!(restored.account.first_block_index, Some(420));

    // An explicit block wins over the file
    let (_wallet, fresh) = create_context(&temp_dir, 500);
    let restored = fresh
        .account_service
        .import(path.to_str().unwrap(), None, Some(7))
        .unwrap();
    assert_eq!(restored.account.first_block_index, Some(7));
}

#[test]
fn test_hex_takes_precedence_over_mnemonic() {
    // 64 hex chars are always hex entropy
    let input = "ab".repeat(32);
    let decoded = seed::decode(&input).unwrap();
    assert_eq!(decoded.kind, SeedKind::HexEntropy);
}

#[test]
fn test_invalid_seed_rejected_without_server_call() {
    let temp_dir = TempDir::new().unwrap();
    let (_wallet, context) = create_context(&temp_dir, 10);

    let missing = temp_dir.path().join("no-such-file.json");
    for input in ["abcd", "abandon abandon abandon", missing.to_str().unwrap()] {
        let result = context.account_service.import(input, None, None);
        assert!(matches!(result, Err(Error::InvalidSeed(_))), "{}", input);
    }
    assert!(context.account_service.list().unwrap().is_empty());
}

// ============================================================================
// Account management
// ============================================================================

#[test]
fn test_create_list_rename_delete() {
    let temp_dir = TempDir::new().unwrap();
    let (_wallet, context) = create_context(&temp_dir, 30);

    let account = context.account_service.create(Some("Main"), None).unwrap();
    let listed = context.account_service.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].account.account_id, account.account_id);

    let renamed = context
        .account_service
        .rename(account.short_id(), "Renamed")
        .unwrap();
    assert_eq!(renamed.name, "Renamed");

    // Not yet synced: confirmation is required even with no funds
    let outcome = context
        .account_service
        .delete(account.short_id(), |_, balance| {
            assert!(!balance.is_caught_up());
            false
        })
        .unwrap();
    assert!(matches!(outcome, DeleteOutcome::Cancelled));

    context
        .sync_poller
        .wait_for_sync(&account.account_id, None)
        .unwrap();
    let outcome = context
        .account_service
        .delete(account.short_id(), |_, _| panic!("no confirmation expected"))
        .unwrap();
    assert!(matches!(outcome, DeleteOutcome::Removed(_)));
    assert!(context.account_service.list().unwrap().is_empty());
}

// ============================================================================
// Sync and payments
// ============================================================================

#[test]
fn test_untargeted_sync_catches_up_with_chain() {
    let temp_dir = TempDir::new().unwrap();
    let (wallet, context) = create_context(&temp_dir, 25);
    let account = context.account_service.create(None, Some(0)).unwrap();

    let balance = context
        .sync_poller
        .wait_for_sync(&account.account_id, None)
        .unwrap();
    assert_eq!(balance.account_block_index, 25);
    // Two blocks per poll from block 0
    assert_eq!(wallet.balance_calls(&account.account_id).unwrap(), 13);
}

#[test]
fn test_offline_server_syncs_to_local_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let (wallet, context) = create_context(&temp_dir, 8);
    wallet.set_offline(true).unwrap();
    let account = context.account_service.create(None, Some(0)).unwrap();

    let balance = context
        .sync_poller
        .wait_for_sync(&account.account_id, None)
        .unwrap();
    assert!(balance.is_offline());
    assert_eq!(balance.account_block_index, 8);
}

#[test]
fn test_sync_that_cannot_finish_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let (_wallet, context) = create_context(&temp_dir, 10);
    let account = context.account_service.create(None, Some(10)).unwrap();

    // Block 11 never arrives
    let result = context
        .sync_poller
        .wait_for_sync(&account.account_id, Some(11));
    match result {
        Err(Error::SyncTimeout {
            target,
            last_synced,
            ..
        }) => {
            assert_eq!(target, 11);
            assert_eq!(last_synced, Some(10));
        }
        other => panic!("expected SyncTimeout, got {:?}", other),
    }
}

#[test]
fn test_payment_between_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let (wallet, context) = create_context(&temp_dir, 100);
    wallet.insert_account("a11ce0", "Alice", 2 * ONE_MOB).unwrap();
    let bob = wallet.insert_account("b0b000", "Bob", 0).unwrap();

    let alice = context.account_service.resolve("a1").unwrap();
    let outcome = context
        .transaction_service
        .send_and_confirm(
            &alice.account_id,
            Decimal::from_str("0.25").unwrap(),
            &bob.main_address,
            |preview| preview.amount_pmob == ONE_MOB / 4,
        )
        .unwrap();

    let SendOutcome::Sent { result, balance } = outcome else {
        panic!("expected Sent");
    };
    assert_eq!(result.confirmation_block_index(), 101);
    assert_eq!(
        balance.unwrap().unspent_mob(),
        Decimal::from_str("1.75").unwrap()
    );

    let received = context
        .transaction_service
        .confirm_receipt(&bob.account_id, &result)
        .unwrap();
    assert_eq!(received.unspent_mob(), Decimal::from_str("0.25").unwrap());

    let (_, txos) = context.account_service.history("b0b").unwrap();
    assert_eq!(txos.len(), 1);
    assert_eq!(txos[0].received_block_index, Some(101));
}

#[test]
fn test_failed_submission_leaves_balances_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let (wallet, context) = create_context(&temp_dir, 100);
    wallet.insert_account("a11ce0", "Alice", ONE_MOB).unwrap();
    wallet.fail_next_submit("Connection reset").unwrap();

    let result = context.transaction_service.send_and_confirm(
        "a11ce0",
        Decimal::ONE,
        "addr-elsewhere",
        |_| true,
    );
    assert!(matches!(result, Err(Error::SubmissionFailed(_))));
    assert_eq!(wallet.submit_count().unwrap(), 1);
    assert_eq!(wallet.block_index().unwrap(), 100);

    let balance = context.account_service.balance("a11").unwrap().balance;
    assert_eq!(balance.unspent_pmob, ONE_MOB);
}
