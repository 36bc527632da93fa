//! Stored rows
//!
//! The raw shape of a payments row as read or written by the store. Rows
//! never leave the store; they are turned into `Payment` values here.

use rusqlite::types::ValueRef;
use rusqlite::Row;
use uuid::Uuid;

use crate::codec::{self, PaymentData};
use crate::payment::{Payment, PaymentError, PaymentResult, PaymentUpsert};
use crate::planner::{BlobFetch, Column, ProjectionPlan};

/// A row ready to be inserted
#[derive(Debug)]
pub(crate) struct StoredRow {
    pub id: String,
    pub organisation_id: String,
    pub data: Vec<u8>,
}

impl StoredRow {
    /// Encodes a new payment under the given identity
    pub fn encode(id: Uuid, upsert: &PaymentUpsert) -> PaymentResult<Self> {
        Ok(Self {
            id: id.to_string(),
            organisation_id: upsert.organisation_id.to_string(),
            data: codec::encode(&PaymentData::from(upsert))?,
        })
    }
}

/// A stored cell, copied out of the row without any type conversion
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(Vec<u8>),
    Blob(Vec<u8>),
}

impl Cell {
    fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Integer(_) => "integer",
            Cell::Real(_) => "real",
            Cell::Text(_) => "text",
            Cell::Blob(_) => "blob",
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(r) => Cell::Real(r),
            ValueRef::Text(t) => Cell::Text(t.to_vec()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

/// The cells of a row read through a projection plan, as stored
#[derive(Debug)]
pub(crate) struct ProjectedRow {
    id: Cell,
    version: Option<Cell>,
    organisation_id: Option<Cell>,
    blob: Option<Cell>,
}

impl ProjectedRow {
    /// Reads the cells the plan selected, by position. Storage types are
    /// checked on decode, so a mistyped cell is a format error and not an
    /// engine error.
    pub fn read(row: &Row<'_>, plan: &ProjectionPlan) -> rusqlite::Result<Self> {
        let cell = |index: Option<usize>| -> rusqlite::Result<Option<Cell>> {
            match index {
                Some(i) => Ok(Some(Cell::from(row.get_ref(i)?))),
                None => Ok(None),
            }
        };
        Ok(Self {
            id: Cell::from(row.get_ref(0)?),
            version: cell(plan.column_index(Column::Version))?,
            organisation_id: cell(plan.column_index(Column::OrganisationId))?,
            blob: cell(plan.blob_index())?,
        })
    }

    /// Turns the row into a payment. Unselected fields keep their zero value.
    pub fn decode(self, plan: &ProjectionPlan) -> PaymentResult<Payment> {
        let id = text("id", &self.id)?;
        let mut payment = Payment {
            id: parse_uuid("id", id)?,
            ..Payment::default()
        };

        if let Some(ref cell) = self.version {
            payment.version = match cell {
                Cell::Integer(v) => u32::try_from(*v).map_err(|_| {
                    PaymentError::invalid_format("stored version out of range")
                        .var("id", id)
                        .var("version", v)
                })?,
                other => return Err(mistyped("version", other).var("id", id)),
            };
        }
        if let Some(ref cell) = self.organisation_id {
            let org = text("organisation_id", cell).map_err(|e| e.var("id", id))?;
            payment.organisation_id = parse_uuid("organisation_id", org)?;
        }

        // JSON is accepted whether it was stored as BLOB or TEXT
        let bytes = match (&plan.blob, &self.blob) {
            (BlobFetch::Skip, _) | (_, None) => None,
            (BlobFetch::Paths(_), Some(Cell::Null)) => {
                return Err(PaymentError::invalid_format("blob is not a complete payment object")
                    .var("id", id));
            }
            (_, Some(Cell::Blob(b))) | (_, Some(Cell::Text(b))) => Some(b.as_slice()),
            (_, Some(other)) => return Err(mistyped("data", other).var("id", id)),
        };
        let data = match (&plan.blob, bytes) {
            (BlobFetch::Whole, Some(bytes)) => Some(codec::decode(bytes)?.masked(&plan.selection)),
            (BlobFetch::Paths(_), Some(bytes)) => {
                Some(codec::decode_projected(bytes, &plan.selection)?)
            }
            _ => None,
        };
        if let Some(data) = data {
            data.apply_to(&mut payment);
        }

        Ok(payment)
    }

    /// The stored identity, for diagnostics
    pub fn id(&self) -> String {
        match &self.id {
            Cell::Text(t) => String::from_utf8_lossy(t).into_owned(),
            other => format!("<{}>", other.type_name()),
        }
    }
}

fn text<'a>(column: &str, cell: &'a Cell) -> PaymentResult<&'a str> {
    match cell {
        Cell::Text(t) => std::str::from_utf8(t).map_err(|e| {
            PaymentError::invalid_format(e.to_string()).var("column", column)
        }),
        other => Err(mistyped(column, other)),
    }
}

fn mistyped(column: &str, cell: &Cell) -> PaymentError {
    PaymentError::invalid_format("stored cell has the wrong type")
        .var("column", column)
        .var("type", cell.type_name())
}

fn parse_uuid(column: &str, value: &str) -> PaymentResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        PaymentError::invalid_format(e.to_string())
            .var("column", column)
            .var("value", value)
    })
}
