//! JSON I/O handling for the CLI
//!
//! - Input: a single JSON object on one stdin line
//! - Output: a single JSON object on stdout; log lines go to stderr
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request<T: DeserializeOwned>() -> CliResult<T> {
    let stdin = io::stdin();
    parse_request(stdin.lock())
}

fn parse_request<T: DeserializeOwned, R: BufRead>(mut reader: R) -> CliResult<T> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::input("empty input"));
    }

    Ok(serde_json::from_str(&line)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(&response)
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
