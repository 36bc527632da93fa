//! Storage subsystem for paystore
//!
//! Persists payments in one SQLite table and maps every engine failure to a
//! `PaymentError`.
//!
//! # Responsibilities
//!
//! - Create or verify the schema when a store is opened
//! - Run each operation on its own connection, bounded by its deadline
//! - Enforce optimistic concurrency on update
//! - Fetch only the columns and blob keys a selection asks for

mod config;
mod mapper;
mod row;
mod schema;
mod service;
mod session;

pub use config::{JournalMode, StoreConfig, SyncMode};
pub use mapper::{map_engine_error, EngineCondition};
pub use schema::{SCHEMA_VERSION, TABLE};
pub use service::SqlitePaymentStore;
