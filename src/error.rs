//! Error types for todo
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown id, nothing to clear)
//! - 3: Data file corrupted (collection was reset, backup kept)
//! - 4: Operation failed (I/O, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the todo CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const DATA_CORRUPTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todo operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Task {id} not found")]
    NotFound { id: u64, available: Vec<u64> },

    #[error("Task {0} is already done")]
    AlreadyDone(u64),

    #[error("Task list is already empty")]
    EmptyCollection,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Data file corruption (exit code 3)
    #[error("Data file is not a task list: {message}")]
    Format {
        message: String,
        backup: Option<PathBuf>,
    },

    #[error("Invalid task record #{record}: field `{field}` {reason}")]
    Schema {
        record: usize,
        field: String,
        reason: String,
        backup: Option<PathBuf>,
    },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to save {}: {source}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::NotFound { .. }
            | Error::AlreadyDone(_)
            | Error::EmptyCollection
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::Format { .. } | Error::Schema { .. } => exit_codes::DATA_CORRUPTED,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::SaveFailed { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Stable label used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound { .. } => "not_found",
            Error::AlreadyDone(_) => "already_done",
            Error::EmptyCollection => "empty_collection",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Format { .. } => "format",
            Error::Schema { .. } => "schema",
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::SaveFailed { .. } => {
                "io"
            }
        }
    }

    /// Whether this error means the data file could not be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Format { .. } | Error::Schema { .. })
    }

    /// Structured details for JSON output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { available, .. } => {
                Some(serde_json::json!({ "available_ids": available }))
            }
            Error::Format {
                backup: Some(backup),
                ..
            } => Some(serde_json::json!({ "backup": backup.display().to_string() })),
            Error::Schema {
                record,
                field,
                backup,
                ..
            } => {
                let mut details = serde_json::json!({ "record": record, "field": field });
                if let Some(backup) = backup {
                    details["backup"] = serde_json::json!(backup.display().to_string());
                }
                Some(details)
            }
            _ => None,
        }
    }
}

/// Result type alias for todo operations
pub type Result<T> = std::result::Result<T, Error>;
