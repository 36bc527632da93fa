//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` with the elapsed time when completed
//! - Logs `{name}_FAILED` when failed, `{name}_INCOMPLETE` on drop otherwise

use std::cell::Cell;
use std::time::Instant;

use super::logger::{Logger, Severity};

/// A scope that logs the start and outcome of a multi-step operation
///
/// ```ignore
/// let scope = ObservationScope::with_fields("STORE_OPEN", &[("path", "/var/p.db")]);
/// // ... do work ...
/// scope.complete(); // logs STORE_OPEN_COMPLETE
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    /// Create a new observation scope
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a new observation scope with fields repeated on every line
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        let event = format!("{}_BEGIN", name);
        Logger::trace(&event, fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.completed.set(true);
        let event = format!("{}_COMPLETE", self.name);
        let elapsed = self.timer.elapsed_ms();
        let mut fields = self.field_refs();
        fields.push(("elapsed_ms", &elapsed));
        Logger::info(&event, &fields);
    }

    /// Mark the scope as failed, at ERROR or FATAL severity
    pub fn fail(self, severity: Severity, reason: &str) {
        self.completed.set(true);
        let event = format!("{}_FAILED", self.name);
        let mut fields = self.field_refs();
        fields.push(("reason", reason));
        Logger::log(severity.max(Severity::Error), &event, &fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::warn(&event, &[("reason", "scope dropped without completion")]);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
