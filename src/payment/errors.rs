//! Payment error types
//!
//! Every failure surfaced by a payment service is a `PaymentError` of one of
//! a closed set of kinds. Callers branch on the kind, never on the engine.
//!
//! Error codes:
//! - PAYMENT_INVALID_ARGUMENT (ERROR)
//! - PAYMENT_INVALID_IDENTITY (ERROR)
//! - PAYMENT_INVALID (ERROR)
//! - PAYMENT_NOT_FOUND (ERROR)
//! - PAYMENT_VERSION_CONFLICT (ERROR)
//! - PAYMENT_OPERATION_ABORTED (ERROR, retryable)
//! - PAYMENT_SCHEMA_CHANGED (FATAL)
//! - PAYMENT_STORE_UNAVAILABLE (ERROR)
//! - PAYMENT_STORE_LIMIT_EXCEEDED (ERROR)
//! - PAYMENT_UNEXPECTED_STORE_ERROR (ERROR)
//! - PAYMENT_UNEXPECTED_SYSTEM_ERROR (ERROR)
//! - PAYMENT_INVALID_FORMAT (ERROR)

use std::fmt;

/// Severity levels for payment errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the process keeps serving
    Error,
    /// The process instance must be restarted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Domain error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument is malformed or out of range
    InvalidArgument,
    /// The payment identity is nil or malformed
    InvalidIdentity,
    /// The payment violates a validation rule or a store constraint
    InvalidPayment,
    /// No payment matched
    NotFound,
    /// The payment exists but not at the expected version
    VersionConflict,
    /// Lock contention, interruption or deadline expiry; the caller may retry
    OperationAborted,
    /// The on-disk schema differs from the one this process was built against
    SchemaChanged,
    /// The database cannot be opened or isn't a database
    StoreUnavailable,
    /// A value exceeds a store size limit
    StoreLimitExceeded,
    /// Corruption, I/O or internal store fault
    UnexpectedStoreError,
    /// Out of memory or an operating system failure
    UnexpectedSystemError,
    /// A stored blob isn't a valid payment encoding
    InvalidFormat,
}

impl ErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; 12] = [
        ErrorKind::InvalidArgument,
        ErrorKind::InvalidIdentity,
        ErrorKind::InvalidPayment,
        ErrorKind::NotFound,
        ErrorKind::VersionConflict,
        ErrorKind::OperationAborted,
        ErrorKind::SchemaChanged,
        ErrorKind::StoreUnavailable,
        ErrorKind::StoreLimitExceeded,
        ErrorKind::UnexpectedStoreError,
        ErrorKind::UnexpectedSystemError,
        ErrorKind::InvalidFormat,
    ];

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "PAYMENT_INVALID_ARGUMENT",
            ErrorKind::InvalidIdentity => "PAYMENT_INVALID_IDENTITY",
            ErrorKind::InvalidPayment => "PAYMENT_INVALID",
            ErrorKind::NotFound => "PAYMENT_NOT_FOUND",
            ErrorKind::VersionConflict => "PAYMENT_VERSION_CONFLICT",
            ErrorKind::OperationAborted => "PAYMENT_OPERATION_ABORTED",
            ErrorKind::SchemaChanged => "PAYMENT_SCHEMA_CHANGED",
            ErrorKind::StoreUnavailable => "PAYMENT_STORE_UNAVAILABLE",
            ErrorKind::StoreLimitExceeded => "PAYMENT_STORE_LIMIT_EXCEEDED",
            ErrorKind::UnexpectedStoreError => "PAYMENT_UNEXPECTED_STORE_ERROR",
            ErrorKind::UnexpectedSystemError => "PAYMENT_UNEXPECTED_SYSTEM_ERROR",
            ErrorKind::InvalidFormat => "PAYMENT_INVALID_FORMAT",
        }
    }

    /// Returns the severity level for this kind
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::SchemaChanged => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns true when retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::OperationAborted)
    }

    /// Default message used when the caller doesn't provide one
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidIdentity => "invalid payment identity",
            ErrorKind::InvalidPayment => "the payment is invalid",
            ErrorKind::NotFound => "payment not found",
            ErrorKind::VersionConflict => "the payment was modified concurrently",
            ErrorKind::OperationAborted => "the operation was aborted, it may be retried",
            ErrorKind::SchemaChanged => {
                "the schema of the store has been altered, the service must be restarted"
            }
            ErrorKind::StoreUnavailable => {
                "the store cannot be opened or the file isn't a valid database"
            }
            ErrorKind::StoreLimitExceeded => "a value exceeds a limit of the store",
            ErrorKind::UnexpectedStoreError => "unexpected store error",
            ErrorKind::UnexpectedSystemError => "unexpected system error",
            ErrorKind::InvalidFormat => "the blob stored in the store isn't of a valid format",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Structured diagnostic attached to an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    /// An offending argument and its value
    Argument { name: String, value: String },
    /// A variable relevant to the failure
    Variable { name: String, value: String },
    /// A call into the store and its parameters
    Call { function: String, params: String },
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metadata::Argument { name, value } => write!(f, "arg.{}={}", name, value),
            Metadata::Variable { name, value } => write!(f, "var.{}={}", name, value),
            Metadata::Call { function, params } => write!(f, "call.{}({})", function, params),
        }
    }
}

/// Payment error with kind, message and diagnostics
#[derive(Debug, Clone)]
pub struct PaymentError {
    kind: ErrorKind,
    message: String,
    metadata: Vec<Metadata>,
    /// Text of the underlying cause. Engine error values are never kept.
    cause: Option<String>,
}

impl PaymentError {
    /// Create an error of the given kind with its default message
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            metadata: Vec::new(),
            cause: None,
        }
    }

    /// Create an error with a custom message
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata: Vec::new(),
            cause: None,
        }
    }

    /// Create an invalid argument error naming the argument
    pub fn invalid_argument(
        name: impl Into<String>,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_message(ErrorKind::InvalidArgument, reason).arg(name, value)
    }

    /// Create an invalid identity error
    pub fn invalid_identity(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InvalidIdentity).arg(name, value)
    }

    /// Create an invalid payment error
    pub fn invalid_payment(reason: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidPayment, reason)
    }

    /// Create a not found error for a payment identity
    pub fn not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound).var("id", id)
    }

    /// Create a version conflict error
    pub fn version_conflict(id: impl fmt::Display, expected_version: u32) -> Self {
        Self::new(ErrorKind::VersionConflict)
            .var("id", id)
            .var("expected_version", expected_version)
    }

    /// Create an invalid format error
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat).caused_by(reason)
    }

    /// Attach an argument
    pub fn arg(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.metadata.push(Metadata::Argument {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    /// Attach a variable
    pub fn var(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.metadata.push(Metadata::Variable {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    /// Attach a store call and its parameters
    pub fn call(mut self, function: impl Into<String>, params: impl Into<String>) -> Self {
        self.metadata.push(Metadata::Call {
            function: function.into(),
            params: params.into(),
        });
        self
    }

    /// Record the text of the underlying cause
    pub fn caused_by(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attached diagnostics
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Returns the text of the underlying cause
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Returns whether the process must be restarted
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether the caller may retry
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if the error is of the given kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.kind.severity(),
            self.kind.code(),
            self.message
        )?;
        if !self.metadata.is_empty() {
            let md: Vec<String> = self.metadata.iter().map(|m| m.to_string()).collect();
            write!(f, " ({})", md.join(", "))?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for PaymentError {}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
