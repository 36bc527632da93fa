//! Read planner for paystore
//!
//! Compiles selections into projection plans and find requests into
//! bounded statements against the payments table.
//!
//! # Design Principles
//!
//! - Deterministic: same inputs, same plan
//! - Minimal: unselected fields are never fetched
//! - Bounded: every find carries a positive, capped limit
//! - Correct without optimization: whole-blob decode is always valid,
//!   sub-path extraction is an optional shortcut

mod projection;
mod query;

pub use projection::{BlobFetch, Column, ProjectionPlan, ProjectionPlanner};
pub use query::{QueryPlan, QueryPlanner};
