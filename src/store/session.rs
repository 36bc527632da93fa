//! Per-operation database session
//!
//! Each operation opens its own connection and closes it on every exit
//! path, so no connection is shared between concurrent operations. Lock
//! waits are bounded by the caller's deadline.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use rusqlite::{ffi, Connection, OpenFlags};

use crate::payment::{Deadline, ErrorKind, PaymentError, PaymentResult};

use super::config::{is_uri, StoreConfig};
use super::mapper::map_engine_error;

/// An open connection scoped to one operation
pub(crate) struct Session {
    conn: Connection,
}

impl Session {
    /// Opens a session on an existing database.
    ///
    /// Fails with `OperationAborted` before touching the file when the
    /// deadline has already passed.
    pub fn acquire(path: &Path, config: &StoreConfig, deadline: Deadline) -> PaymentResult<Self> {
        if deadline.is_expired() {
            return Err(PaymentError::with_message(
                ErrorKind::OperationAborted,
                "deadline expired before the operation started",
            ));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = open_connection(path, flags)?;

        Self::configure(&conn, config, deadline)?;
        Ok(Self { conn })
    }

    /// Wraps a freshly created connection
    pub fn from_connection(
        conn: Connection,
        config: &StoreConfig,
        deadline: Deadline,
    ) -> PaymentResult<Self> {
        Self::configure(&conn, config, deadline)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection, config: &StoreConfig, deadline: Deadline) -> PaymentResult<()> {
        // busy timeout first so the pragmas below wait on a locked file
        conn.busy_timeout(deadline.bound(config.busy_timeout()))
            .map_err(|e| map_engine_error(&e, "busy_timeout", ""))?;
        let pragma = format!("PRAGMA synchronous = {};", config.synchronous.pragma_value());
        conn.execute_batch(&pragma)
            .map_err(|e| map_engine_error(&e, "PRAGMA synchronous", ""))?;
        Ok(())
    }
}

/// Opens a connection on `path`.
///
/// A `file:` URI the engine refuses to parse (malformed, unknown or
/// disallowed mode) is an argument error, not a store fault.
pub(crate) fn open_connection(path: &Path, flags: OpenFlags) -> PaymentResult<Connection> {
    Connection::open_with_flags(path, flags).map_err(|e| {
        let target = path.display().to_string();
        match e {
            rusqlite::Error::SqliteFailure(ref f, _)
                if is_uri(path)
                    && matches!(f.extended_code, ffi::SQLITE_ERROR | ffi::SQLITE_PERM) =>
            {
                PaymentError::invalid_argument("path", &target, "database URI rejected")
                    .call("open", &target)
                    .caused_by(e.to_string())
            }
            _ => map_engine_error(&e, "open", target),
        }
    })
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
