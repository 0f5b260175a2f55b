//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
pub mod logging;
pub mod server;
mod sync;
mod transaction;

pub use account::{AccountService, AccountWithBalance, DeleteOutcome, ExportOutcome, ImportedAccount};
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use server::{wait_until_reachable, ServerLauncher, ServerStart};
pub use sync::{SyncPoller, SyncProgress};
pub use transaction::{PaymentPreview, SendOutcome, TransactionService};
