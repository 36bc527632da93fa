//! CLI module for paystore
//!
//! One-shot commands against a store file:
//! - init: create or verify the store
//! - create, get, update, delete: single payment operations
//! - find: list payments

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SortArg};
pub use commands::{create, delete, find, get, init, run, run_command, update};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_error, write_response};
