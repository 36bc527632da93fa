//! Payments table schema
//!
//! One table holds every payment: the identity, version and organisation as
//! columns and the remaining attributes as an opaque JSON blob. The schema
//! version is stamped in `PRAGMA user_version`; a store stamped with another
//! version, or whose table columns differ, is refused as `SchemaChanged`.

use rusqlite::{Connection, TransactionBehavior};

use crate::payment::{ErrorKind, PaymentError, PaymentResult};

use super::mapper::map_engine_error;

/// Schema version written to `user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Name of the payments table
pub const TABLE: &str = "payments";

/// Expected columns and declared types, in table order
const COLUMNS: [(&str, &str); 4] = [
    ("id", "TEXT"),
    ("version", "INTEGER"),
    ("organisation_id", "TEXT"),
    ("data", "BLOB"),
];

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS payments (
    id              TEXT    PRIMARY KEY NOT NULL,
    version         INTEGER NOT NULL DEFAULT 0
                            CHECK (version >= 0 AND version <= 4294967295),
    organisation_id TEXT    NOT NULL,
    data            BLOB    NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS payments_organisation_id ON payments (organisation_id)";

/// Creates the schema on a fresh store or verifies an existing one
pub(crate) fn bootstrap(conn: &mut Connection) -> PaymentResult<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| map_engine_error(&e, "BEGIN IMMEDIATE", "bootstrap"))?;

    let version: i64 = tx
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| map_engine_error(&e, "PRAGMA user_version", ""))?;

    match version {
        0 => {
            if table_exists(&tx)? {
                verify_columns(&tx)?;
            }
            tx.execute_batch(CREATE_TABLE)
                .map_err(|e| map_engine_error(&e, "CREATE TABLE", TABLE))?;
            tx.execute_batch(CREATE_INDEX)
                .map_err(|e| map_engine_error(&e, "CREATE INDEX", TABLE))?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
                .map_err(|e| map_engine_error(&e, "PRAGMA user_version", SCHEMA_VERSION.to_string()))?;
        }
        SCHEMA_VERSION => verify_columns(&tx)?,
        other => {
            return Err(PaymentError::new(ErrorKind::SchemaChanged)
                .var("user_version", other)
                .var("expected_user_version", SCHEMA_VERSION));
        }
    }

    tx.commit()
        .map_err(|e| map_engine_error(&e, "COMMIT", "bootstrap"))
}

fn table_exists(conn: &Connection) -> PaymentResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [TABLE],
        |row| row.get(0),
    )
    .map_err(|e| map_engine_error(&e, "SELECT sqlite_master", TABLE))
}

/// Checks the table's columns against the expected set
fn verify_columns(conn: &Connection) -> PaymentResult<()> {
    let map = |e: rusqlite::Error| map_engine_error(&e, "PRAGMA table_info", TABLE);

    let mut stmt = conn.prepare("PRAGMA table_info(payments)").map_err(map)?;
    let found = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })
        .map_err(map)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map)?;

    let matches = found.len() == COLUMNS.len()
        && found
            .iter()
            .zip(COLUMNS.iter())
            .all(|((name, ty), (want_name, want_ty))| {
                name == want_name && ty.eq_ignore_ascii_case(want_ty)
            });

    if !matches {
        let names: Vec<&str> = found.iter().map(|(n, _)| n.as_str()).collect();
        return Err(PaymentError::new(ErrorKind::SchemaChanged)
            .var("table", TABLE)
            .var("columns", names.join(",")));
    }
    Ok(())
}
