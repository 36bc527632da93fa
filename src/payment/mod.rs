//! Payment domain for paystore
//!
//! Defines the payment entity, the selection of fields to read, listing
//! parameters, the error taxonomy and the service contract that storage
//! implementations fulfil.
//!
//! # Invariants
//!
//! - Identity and organisation never change after create
//! - Version starts at 0 and increases by exactly one per update
//! - Unselected fields are never fetched and read back as zero values
//! - Every failure is a `PaymentError` of a known `ErrorKind`

mod context;
mod errors;
mod query;
mod selection;
mod types;

pub use context::Deadline;
pub use errors::{ErrorKind, Metadata, PaymentError, PaymentResult, Severity};
pub use query::{Chunk, Filter, Sort, SortDirection, SortField};
pub use selection::{Selection, SelectionAttributes};
pub use types::{
    ChargesInformation, ForeignExchange, Party, Payment, PaymentAttributes, PaymentUpsert,
    SenderCharge,
};

use uuid::Uuid;

/// Persistence contract for payments
///
/// Operations are synchronous and safe to call from many threads. Each one
/// is independent; none spans a transaction across calls.
pub trait PaymentService: Send + Sync {
    /// Stores a new payment at version 0 and returns its identity
    fn create(&self, deadline: Deadline, payment: &PaymentUpsert) -> PaymentResult<Uuid>;

    /// Reads the selected fields of one payment
    fn get(&self, deadline: Deadline, id: Uuid, selection: &Selection) -> PaymentResult<Payment>;

    /// Reads a page of payments. No match is an empty page, not an error.
    fn find(
        &self,
        deadline: Deadline,
        filter: &Filter,
        selection: &Selection,
        sort: Option<Sort>,
        chunk: Chunk,
    ) -> PaymentResult<Vec<Payment>>;

    /// Replaces the attributes of a payment if it's still at `expected_version`
    fn update(
        &self,
        deadline: Deadline,
        id: Uuid,
        expected_version: u32,
        payment: &PaymentUpsert,
    ) -> PaymentResult<()>;

    /// Removes a payment
    fn delete(&self, deadline: Deadline, id: Uuid) -> PaymentResult<()>;
}

/// Rejects the nil identity before any I/O
pub(crate) fn check_identity(id: Uuid) -> PaymentResult<()> {
    if id.is_nil() {
        return Err(PaymentError::invalid_identity("id", id));
    }
    Ok(())
}
