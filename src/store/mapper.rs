//! Engine error mapping
//!
//! Every `rusqlite::Error` crossing into the domain goes through
//! `map_engine_error`. Classification happens in two steps: the engine error
//! is reduced to a closed `EngineCondition`, and each condition has exactly
//! one domain kind. No engine error value escapes this module; only its text
//! is kept as the cause.

use rusqlite::ErrorCode;

use crate::payment::{ErrorKind, PaymentError};

/// Engine failure conditions the store distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCondition {
    /// The file cannot be opened or isn't a database
    CannotOpen,
    /// Busy, locked or interrupted
    Contention,
    /// The schema changed under a prepared statement
    SchemaChanged,
    /// Corruption, I/O, full disk, locking protocol or internal fault
    StorageFault,
    OutOfMemory,
    /// A string or blob exceeds the engine limit
    TooBig,
    /// A constraint rejected the row
    Constraint,
    /// A single-row query matched nothing
    NoRows,
    /// Anything the engine reports that isn't classified above
    Unclassified,
}

impl EngineCondition {
    /// Reduces an engine error to its condition
    pub fn classify(err: &rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _) => match e.code {
                ErrorCode::CannotOpen | ErrorCode::NotADatabase => EngineCondition::CannotOpen,
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::OperationInterrupted => EngineCondition::Contention,
                ErrorCode::SchemaChanged => EngineCondition::SchemaChanged,
                ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::InternalMalfunction
                | ErrorCode::FileLockingProtocolFailed => EngineCondition::StorageFault,
                ErrorCode::OutOfMemory => EngineCondition::OutOfMemory,
                ErrorCode::TooBig => EngineCondition::TooBig,
                ErrorCode::ConstraintViolation => EngineCondition::Constraint,
                _ => EngineCondition::Unclassified,
            },
            rusqlite::Error::QueryReturnedNoRows => EngineCondition::NoRows,
            rusqlite::Error::InvalidPath(_) => EngineCondition::CannotOpen,
            _ => EngineCondition::Unclassified,
        }
    }

    /// The domain kind for this condition
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineCondition::CannotOpen => ErrorKind::StoreUnavailable,
            EngineCondition::Contention => ErrorKind::OperationAborted,
            EngineCondition::SchemaChanged => ErrorKind::SchemaChanged,
            EngineCondition::StorageFault => ErrorKind::UnexpectedStoreError,
            EngineCondition::OutOfMemory => ErrorKind::UnexpectedSystemError,
            EngineCondition::TooBig => ErrorKind::StoreLimitExceeded,
            EngineCondition::Constraint => ErrorKind::InvalidPayment,
            EngineCondition::NoRows => ErrorKind::NotFound,
            EngineCondition::Unclassified => ErrorKind::UnexpectedStoreError,
        }
    }
}

/// Maps an engine error to a domain error, recording the failing call.
///
/// `call` names the statement or engine function, `params` the identifying
/// parameters (never blob contents).
pub fn map_engine_error(
    err: &rusqlite::Error,
    call: impl Into<String>,
    params: impl Into<String>,
) -> PaymentError {
    let condition = EngineCondition::classify(err);
    let mut mapped = PaymentError::new(condition.kind())
        .call(call, params)
        .caused_by(err.to_string());
    if let rusqlite::Error::SqliteFailure(e, _) = err {
        mapped = mapped.var("extended_code", e.extended_code);
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn test_engine_codes_map_to_kinds() {
        let cases = [
            (ffi::SQLITE_CANTOPEN, ErrorKind::StoreUnavailable),
            (ffi::SQLITE_NOTADB, ErrorKind::StoreUnavailable),
            (ffi::SQLITE_BUSY, ErrorKind::OperationAborted),
            (ffi::SQLITE_LOCKED, ErrorKind::OperationAborted),
            (ffi::SQLITE_INTERRUPT, ErrorKind::OperationAborted),
            (ffi::SQLITE_SCHEMA, ErrorKind::SchemaChanged),
            (ffi::SQLITE_CORRUPT, ErrorKind::UnexpectedStoreError),
            (ffi::SQLITE_IOERR, ErrorKind::UnexpectedStoreError),
            (ffi::SQLITE_FULL, ErrorKind::UnexpectedStoreError),
            (ffi::SQLITE_INTERNAL, ErrorKind::UnexpectedStoreError),
            (ffi::SQLITE_PROTOCOL, ErrorKind::UnexpectedStoreError),
            (ffi::SQLITE_NOMEM, ErrorKind::UnexpectedSystemError),
            (ffi::SQLITE_TOOBIG, ErrorKind::StoreLimitExceeded),
            (ffi::SQLITE_CONSTRAINT, ErrorKind::InvalidPayment),
            (ffi::SQLITE_MISMATCH, ErrorKind::UnexpectedStoreError),
        ];
        for (code, kind) in cases {
            let err = map_engine_error(&failure(code), "step", "");
            assert_eq!(err.kind(), kind, "code {}", code);
        }
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let err = map_engine_error(&rusqlite::Error::QueryReturnedNoRows, "SELECT", "id=1");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unclassified_non_engine_error() {
        let err = rusqlite::Error::InvalidColumnIndex(7);
        assert_eq!(EngineCondition::classify(&err), EngineCondition::Unclassified);
        assert_eq!(
            map_engine_error(&err, "get", "").kind(),
            ErrorKind::UnexpectedStoreError
        );
    }

    #[test]
    fn test_mapped_error_keeps_call_and_cause() {
        let err = map_engine_error(&failure(ffi::SQLITE_BUSY), "UPDATE payments", "id=abc");
        let display = err.to_string();
        assert!(display.contains("call.UPDATE payments(id=abc)"));
        assert!(display.contains("var.extended_code=5"));
        assert!(err.cause().is_some());
        assert!(err.is_retryable());
    }
}
