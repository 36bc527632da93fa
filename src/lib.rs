//! paystore - a single-table payment persistence engine on embedded SQLite
//!
//! Payments keep their identity, version and organisation in columns and
//! every other attribute in a JSON blob. Reads fetch only the fields the
//! caller selects; updates are guarded by the version the caller last saw.

pub mod cli;
pub mod codec;
pub mod observability;
pub mod payment;
pub mod planner;
pub mod store;
