//! Core domain entities
//!
//! Pure data structures and conversions - no I/O except the seed codec's
//! recovery-file branch and export writer.

mod account;
pub mod amount;
mod balance;
pub mod result;
pub mod seed;
mod transaction;
mod wire;

pub use account::{short_id, Account, AccountSecrets, Txo, SHORT_ID_LEN};
pub use balance::Balance;
pub use seed::{DecodedSeed, ExportRecord, SecretEntropy, SeedInput, SeedKind};
pub use transaction::TransactionResult;
