use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Refusing to reset the ledger without --yes")]
    ResetNotConfirmed,

    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Jq(#[from] JqError),
}

/// Errors raised by the ledger store and its operations.
///
/// Validation and not-found errors reject a single operation and leave the
/// ledger untouched. The remaining kinds abort a load or import.
#[derive(Debug, Error)]
pub(crate) enum LedgerError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid {field} \"{value}\" (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Ambiguous {kind} id \"{prefix}\" ({matches} matches)")]
    AmbiguousId {
        kind: &'static str,
        prefix: String,
        matches: usize,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Malformed ledger file {path}: {reason}")]
    MalformedStore { path: PathBuf, reason: String },

    #[error("Invalid ledger format (missing keys: {})", missing.join(", "))]
    SchemaMismatch { missing: Vec<&'static str> },

    #[error("Invalid ledger document: {0}")]
    InvalidDocument(String),

    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LedgerError {
    /// Whether the caller can report the error and keep going.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::MissingField { .. }
                | LedgerError::InvalidValue { .. }
                | LedgerError::AmbiguousId { .. }
                | LedgerError::NotFound { .. }
        )
    }
}

#[derive(Debug, Error)]
pub(crate) enum JqError {
    #[error("jq not found. Please install jq to use --jq option.")]
    NotFound,

    #[error("Failed to run jq: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to write to jq stdin: {0}")]
    Stdin(std::io::Error),

    #[error("Failed to wait for jq: {0}")]
    Wait(std::io::Error),

    #[error("Invalid UTF-8 from jq: {0}")]
    Utf8(std::string::FromUtf8Error),

    #[error("jq error: {0}")]
    Filter(String),
}
