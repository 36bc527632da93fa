//! CLI error types

use std::io;

use thiserror::Error;

use crate::payment::PaymentError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The store refused the operation
    #[error("{0}")]
    Payment(#[from] PaymentError),

    /// A command line value is malformed
    #[error("invalid input: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Payment(e) => e.code(),
            CliError::Input(_) => "PAYSTORE_CLI_INVALID_INPUT",
            CliError::Io(_) => "PAYSTORE_CLI_IO_ERROR",
            CliError::Json(_) => "PAYSTORE_CLI_INVALID_JSON",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
