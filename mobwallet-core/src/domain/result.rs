//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant maps to a different corrective action, so callers should
/// match on them rather than flattening to a string.
#[derive(Error, Debug)]
pub enum Error {
    /// The seed was not 32-byte hex, a valid mnemonic, or a readable recovery file
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Could not find account starting with {0}")]
    AccountNotFound(String),

    #[error("Multiple matching account ids for '{prefix}': {}", .matches.join(", "))]
    AmbiguousAccount { prefix: String, matches: Vec<String> },

    #[error(
        "Account {account_id} did not sync to block {target} in time (last synced block: {})",
        .last_synced.map(|b| b.to_string()).unwrap_or_else(|| "unknown".to_string())
    )]
    SyncTimeout {
        account_id: String,
        target: u64,
        last_synced: Option<u64>,
    },

    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Wallet server unavailable: {0}")]
    RemoteUnavailable(String),

    /// The server answered, but with an error
    #[error("Wallet server error: {0}")]
    Remote(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interrupted while waiting for account {0} to sync")]
    Interrupted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid seed error
    pub fn invalid_seed(msg: impl Into<String>) -> Self {
        Self::InvalidSeed(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a remote error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a transport error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    /// Short hint telling the user what to do about this failure
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::InvalidSeed(_) => {
                Some("Pass 64 hex characters, a 24-word seed phrase, or a path to an exported seed file.")
            }
            Error::AccountNotFound(_) => Some("Run 'mobilecoin list' to see account ids."),
            Error::AmbiguousAccount { .. } => Some("Use a longer account id prefix."),
            Error::SyncTimeout { .. } => {
                Some("The wallet server may be behind or offline. Check it and try again later.")
            }
            Error::SubmissionFailed(_) => {
                Some("Check the account balance and network status. The transaction was not retried.")
            }
            Error::RemoteUnavailable(_) => {
                Some("Is the wallet server running? Start it with 'mobilecoin start'.")
            }
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }

    /// Failed result for `error`; an ambiguous prefix keeps its candidate ids
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::AmbiguousAccount { matches, .. } => {
                let mut context = HashMap::new();
                context.insert("matches".to_string(), serde_json::json!(matches));
                Self::fail_with_context(error.to_string(), context)
            }
            _ => Self::fail(error.to_string()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::from_error(&e),
        }
    }
}
