//! Structured JSON logger
//!
//! - One log line = one event
//! - Keys in deterministic order: `event`, `severity`, then fields sorted
//! - ERROR and FATAL go to stderr, everything else to stdout unless the
//!   process routes all logs to stderr
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Per-operation detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// The store must be reopened
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);
static STDERR_ONLY: AtomicBool = AtomicBool::new(false);

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Sets the lowest severity written. Process wide.
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Returns the lowest severity written
    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Returns true if events at this severity are written
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Sends every severity to stderr, leaving stdout to the caller.
    /// Process wide.
    pub fn set_stderr_only(enabled: bool) {
        STDERR_ONLY.store(enabled, Ordering::Relaxed);
    }

    /// Returns true if events at this severity go to stderr
    pub fn writes_to_stderr(severity: Severity) -> bool {
        severity >= Severity::Error || STDERR_ONLY.load(Ordering::Relaxed)
    }

    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        if Self::writes_to_stderr(severity) {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut line = format_line(severity, event, fields);
        line.push('\n');

        // one write per line
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

/// Renders one log line without the trailing newline
fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut body = Map::new();
    for (key, value) in fields {
        if *key == "event" || *key == "severity" {
            continue;
        }
        body.insert((*key).to_string(), Value::String((*value).to_string()));
    }

    // `body` iterates sorted by key; event and severity always lead
    let mut out = String::with_capacity(128);
    out.push_str("{\"event\":");
    out.push_str(&Value::String(event.to_string()).to_string());
    out.push_str(",\"severity\":\"");
    out.push_str(severity.as_str());
    out.push('"');
    for (key, value) in &body {
        out.push(',');
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        out.push_str(&value.to_string());
    }
    out.push('}');
    out
}

#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
