//! Observable store events
//!
//! Events are explicit and typed; each has one stable name and one
//! severity.

use std::fmt;

use super::logger::Severity;

/// Observable events of a payment store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration file loaded
    ConfigLoaded,
    /// Store opened and schema verified
    StoreOpened,
    /// Schema created on a fresh store
    SchemaCreated,
    /// Store refused: its schema differs (FATAL)
    SchemaChanged,

    // Writes
    PaymentCreated,
    PaymentUpdated,
    PaymentDeleted,
    /// Update refused, the stored version moved on
    VersionConflict,

    // Reads
    PaymentRead,
    PaymentsFound,

    // Failures
    /// Lock wait or deadline exceeded
    OperationAborted,
    /// A stored blob failed to decode
    CorruptBlob,
    /// Any other store failure
    OperationFailed,
}

impl Event {
    /// Every event
    pub const ALL: [Event; 13] = [
        Event::ConfigLoaded,
        Event::StoreOpened,
        Event::SchemaCreated,
        Event::SchemaChanged,
        Event::PaymentCreated,
        Event::PaymentUpdated,
        Event::PaymentDeleted,
        Event::VersionConflict,
        Event::PaymentRead,
        Event::PaymentsFound,
        Event::OperationAborted,
        Event::CorruptBlob,
        Event::OperationFailed,
    ];

    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::SchemaCreated => "SCHEMA_CREATED",
            Event::SchemaChanged => "SCHEMA_CHANGED",
            Event::PaymentCreated => "PAYMENT_CREATED",
            Event::PaymentUpdated => "PAYMENT_UPDATED",
            Event::PaymentDeleted => "PAYMENT_DELETED",
            Event::VersionConflict => "VERSION_CONFLICT",
            Event::PaymentRead => "PAYMENT_READ",
            Event::PaymentsFound => "PAYMENTS_FOUND",
            Event::OperationAborted => "OPERATION_ABORTED",
            Event::CorruptBlob => "CORRUPT_BLOB",
            Event::OperationFailed => "OPERATION_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PaymentRead | Event::PaymentsFound => Severity::Trace,
            Event::ConfigLoaded
            | Event::StoreOpened
            | Event::SchemaCreated
            | Event::PaymentCreated
            | Event::PaymentUpdated
            | Event::PaymentDeleted => Severity::Info,
            Event::VersionConflict | Event::OperationAborted => Severity::Warn,
            Event::CorruptBlob | Event::OperationFailed => Severity::Error,
            Event::SchemaChanged => Severity::Fatal,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
