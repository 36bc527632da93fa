//! SQLite payment store
//!
//! Implements `PaymentService` over a single payments table. Each call runs
//! on its own session; updates run in an IMMEDIATE transaction so the
//! version check and the write are one atomic step.

use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, OpenFlags, TransactionBehavior};
use uuid::Uuid;

use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsRegistry, ObservationScope, Severity,
};
use crate::payment::{
    check_identity, Chunk, Deadline, ErrorKind, Filter, Payment, PaymentError, PaymentResult,
    PaymentService, PaymentUpsert, Selection, Sort,
};
use crate::planner::{ProjectionPlanner, QueryPlanner};

use super::config::StoreConfig;
use super::mapper::map_engine_error;
use super::row::{ProjectedRow, StoredRow};
use super::schema;
use super::session::{open_connection, Session};

const INSERT: &str =
    "INSERT INTO payments (id, version, organisation_id, data) VALUES (?1, 0, ?2, ?3)";

const UPDATE: &str = "UPDATE payments SET data = ?1, version = version + 1 \
                      WHERE id = ?2 AND version = ?3 AND organisation_id = ?4";

const CURRENT_ROW: &str = "SELECT version, organisation_id FROM payments WHERE id = ?1";

const DELETE: &str = "DELETE FROM payments WHERE id = ?1";

/// Payment store on an embedded SQLite database
#[derive(Debug)]
pub struct SqlitePaymentStore {
    path: PathBuf,
    config: StoreConfig,
    planner: QueryPlanner,
    metrics: MetricsRegistry,
}

impl SqlitePaymentStore {
    /// Opens the store, creating the database and schema if missing.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an invalid configuration
    /// - `StoreUnavailable` when the file can't be opened or isn't a database
    /// - `SchemaChanged` when an existing schema differs
    pub fn open(config: StoreConfig) -> PaymentResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.log_level);

        let path = config.resolved_path()?;
        let path_str = path.display().to_string();
        let scope = ObservationScope::with_fields("STORE_OPEN", &[("path", &path_str)]);

        match Self::bootstrap(&path, &config) {
            Ok(()) => scope.complete(),
            Err(e) => {
                let level = if e.is_fatal() {
                    Severity::Fatal
                } else {
                    Severity::Error
                };
                scope.fail(level, &e.to_string());
                return Err(e);
            }
        }

        let planner = QueryPlanner::new(
            ProjectionPlanner::new(config.path_extraction),
            config.max_chunk_size,
        );
        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("journal_mode", config.journal_mode.pragma_value()),
                ("path", &path_str),
            ],
        );

        Ok(Self {
            path,
            config,
            planner,
            metrics: MetricsRegistry::new(),
        })
    }

    fn bootstrap(path: &Path, config: &StoreConfig) -> PaymentResult<()> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = open_connection(path, flags)?;

        let mut session = Session::from_connection(conn, config, Deadline::none())?;
        // persistent in the file; set once here
        let pragma = format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value());
        session
            .execute_batch(&pragma)
            .map_err(|e| map_engine_error(&e, "PRAGMA journal_mode", ""))?;

        schema::bootstrap(&mut session)?;
        drop(session);

        // operations reopen without CREATE; surface a refused open now
        Session::acquire(path, config, Deadline::none()).map(drop)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Counters since the store was opened
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    fn session(&self, deadline: Deadline) -> PaymentResult<Session> {
        Session::acquire(&self.path, &self.config, deadline)
            .map_err(|e| self.observe(e, "session"))
    }

    /// Counts and logs a failure on its way to the caller
    fn observe(&self, err: PaymentError, op: &str) -> PaymentError {
        let event = match err.kind() {
            ErrorKind::NotFound => return err,
            ErrorKind::VersionConflict => {
                self.metrics.increment_version_conflicts();
                Event::VersionConflict
            }
            ErrorKind::OperationAborted => {
                self.metrics.increment_aborted();
                Event::OperationAborted
            }
            ErrorKind::SchemaChanged => {
                self.metrics.increment_failed();
                Event::SchemaChanged
            }
            ErrorKind::InvalidFormat => {
                self.metrics.increment_failed();
                Event::CorruptBlob
            }
            _ => {
                self.metrics.increment_failed();
                Event::OperationFailed
            }
        };
        let detail = err.to_string();
        log_event_with_fields(
            event,
            &[("code", err.code()), ("error", &detail), ("op", op)],
        );
        err
    }
}

impl PaymentService for SqlitePaymentStore {
    fn create(&self, deadline: Deadline, payment: &PaymentUpsert) -> PaymentResult<Uuid> {
        payment.validate()?;
        let id = Uuid::new_v4();
        let row = StoredRow::encode(id, payment)?;

        let session = self.session(deadline)?;
        session
            .execute(INSERT, params![row.id, row.organisation_id, row.data])
            .map_err(|e| {
                let params = format!("id={}, organisation_id={}", row.id, row.organisation_id);
                self.observe(map_engine_error(&e, "INSERT INTO payments", params), "create")
            })?;

        self.metrics.increment_created();
        log_event_with_fields(
            Event::PaymentCreated,
            &[("id", &row.id), ("organisation_id", &row.organisation_id)],
        );
        Ok(id)
    }

    fn get(&self, deadline: Deadline, id: Uuid, selection: &Selection) -> PaymentResult<Payment> {
        check_identity(id)?;
        let plan = self.planner.plan_get(selection);
        let sql = format!("SELECT {} FROM payments WHERE id = ?1", plan.select_list());
        let key = id.to_string();

        let session = self.session(deadline)?;
        let row = session
            .query_row(&sql, [&key], |row| ProjectedRow::read(row, &plan))
            .map_err(|e| {
                let err = map_engine_error(&e, "SELECT FROM payments", format!("id={}", key));
                self.observe(err.var("id", &key), "get")
            })?;
        drop(session);

        let payment = row.decode(&plan).map_err(|e| self.observe(e, "get"))?;
        self.metrics.record_read(1);
        log_event_with_fields(
            Event::PaymentRead,
            &[("id", &key), ("plan", &plan.to_string())],
        );
        Ok(payment)
    }

    fn find(
        &self,
        deadline: Deadline,
        filter: &Filter,
        selection: &Selection,
        sort: Option<Sort>,
        chunk: Chunk,
    ) -> PaymentResult<Vec<Payment>> {
        let plan = self.planner.plan_find(filter, selection, sort, chunk)?;
        let map = |e: rusqlite::Error| {
            self.observe(map_engine_error(&e, "SELECT FROM payments", &plan.sql), "find")
        };

        let session = self.session(deadline)?;
        let rows = {
            let mut stmt = session.prepare(&plan.sql).map_err(map)?;
            let rows = stmt
                .query_map(params_from_iter(plan.params.iter()), |row| {
                    ProjectedRow::read(row, &plan.projection)
                })
                .map_err(map)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(map)?;
            rows
        };
        drop(session);

        let payments = rows
            .into_iter()
            .map(|row| {
                let id = row.id().to_string();
                row.decode(&plan.projection)
                    .map_err(|e| self.observe(e.var("id", id), "find"))
            })
            .collect::<PaymentResult<Vec<_>>>()?;

        self.metrics.record_read(payments.len() as u64);
        let count = payments.len().to_string();
        log_event_with_fields(
            Event::PaymentsFound,
            &[("count", &count), ("plan", &plan.projection.to_string())],
        );
        Ok(payments)
    }

    fn update(
        &self,
        deadline: Deadline,
        id: Uuid,
        expected_version: u32,
        payment: &PaymentUpsert,
    ) -> PaymentResult<()> {
        check_identity(id)?;
        payment.validate()?;
        let row = StoredRow::encode(id, payment)?;
        let params_text = format!("id={}, version={}", row.id, expected_version);
        let map = |e: rusqlite::Error, call: &str| {
            self.observe(map_engine_error(&e, call, params_text.as_str()), "update")
        };

        let mut session = self.session(deadline)?;
        let tx = session
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| map(e, "BEGIN IMMEDIATE"))?;

        let changed = tx
            .execute(
                UPDATE,
                params![row.data, row.id, expected_version, row.organisation_id],
            )
            .map_err(|e| map(e, "UPDATE payments"))?;

        if changed == 0 {
            // nothing written; decide why while still holding the write lock
            let stored: Option<(i64, String)> = match tx.query_row(CURRENT_ROW, [&row.id], |r| {
                Ok((r.get(0)?, r.get(1)?))
            }) {
                Ok(found) => Some(found),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(map(e, "SELECT FROM payments")),
            };
            let err = match stored {
                None => PaymentError::not_found(id),
                Some((_, ref org)) if *org != row.organisation_id => {
                    PaymentError::invalid_payment("the organisation of a payment cannot change")
                        .var("id", id)
                        .arg("organisation_id", &row.organisation_id)
                }
                Some((version, _)) => {
                    PaymentError::version_conflict(id, expected_version).var("stored_version", version)
                }
            };
            return Err(self.observe(err, "update"));
        }

        tx.commit().map_err(|e| map(e, "COMMIT"))?;

        self.metrics.increment_updated();
        let next = (u64::from(expected_version) + 1).to_string();
        log_event_with_fields(Event::PaymentUpdated, &[("id", &row.id), ("version", &next)]);
        Ok(())
    }

    fn delete(&self, deadline: Deadline, id: Uuid) -> PaymentResult<()> {
        check_identity(id)?;
        let key = id.to_string();

        let session = self.session(deadline)?;
        let changed = session.execute(DELETE, [&key]).map_err(|e| {
            self.observe(
                map_engine_error(&e, "DELETE FROM payments", format!("id={}", key)),
                "delete",
            )
        })?;

        if changed == 0 {
            return Err(PaymentError::not_found(id));
        }

        self.metrics.increment_deleted();
        log_event_with_fields(Event::PaymentDeleted, &[("id", &key)]);
        Ok(())
    }
}
