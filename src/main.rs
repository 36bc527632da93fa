//! paystore CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`, which reports failures
//! as a JSON error response. Exits non-zero on failure.

use paystore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
