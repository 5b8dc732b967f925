//! Error types for taskboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, missing task, invalid record)
//! - 4: Operation failed (I/O, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Record not found: {0}")]
    NotFound(PathBuf),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid task record: {0}")]
    InvalidRecord(PathBuf),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_)
            | Error::TaskNotFound(_)
            | Error::InvalidRecord(_)
            | Error::Validation(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::Io(_) | Error::Yaml(_) | Error::Json(_) | Error::OperationFailed(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Short machine-readable category name
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) | Error::TaskNotFound(_) => "not_found",
            Error::InvalidRecord(_) => "invalid_record",
            Error::Validation(_) => "validation",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Io(_) => "io",
            Error::Yaml(_) | Error::Json(_) => "serialization",
            Error::OperationFailed(_) => "operation_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(path) | Error::InvalidRecord(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            _ => None,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
