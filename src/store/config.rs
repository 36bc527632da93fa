//! Store configuration
//!
//! Everything the store needs to reach and tune its database, passed into
//! `SqlitePaymentStore::open` instead of living in process globals.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::payment::{ErrorKind, PaymentError, PaymentResult};

/// `SQLite` journal mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Write-ahead log: readers never block the writer
    #[default]
    Wal,
    /// Rollback journal
    Delete,
}

impl JournalMode {
    pub fn pragma_value(self) -> &'static str {
        match self {
            JournalMode::Wal => "wal",
            JournalMode::Delete => "delete",
        }
    }
}

/// `SQLite` synchronous mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Normal,
    Full,
}

impl SyncMode {
    pub fn pragma_value(self) -> &'static str {
        match self {
            SyncMode::Normal => "normal",
            SyncMode::Full => "full",
        }
    }
}

/// Configuration of a payment store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the database file, created if missing. A `file:` URI is
    /// handed to the engine as is.
    pub path: PathBuf,

    /// Longest wait on a locked database when the caller sets no deadline
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default)]
    pub journal_mode: JournalMode,

    #[serde(default)]
    pub synchronous: SyncMode,

    /// Extract selected blob keys in the engine instead of decoding the
    /// whole blob
    #[serde(default = "default_path_extraction")]
    pub path_extraction: bool,

    /// Largest page a find may request
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: u64,

    /// Minimum severity written by the logger
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}
fn default_path_extraction() -> bool {
    true
}
fn default_max_chunk_size() -> u64 {
    1_000
}
fn default_log_level() -> Severity {
    Severity::Info
}

impl StoreConfig {
    /// Configuration with defaults for the given database file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            synchronous: SyncMode::default(),
            path_extraction: default_path_extraction(),
            max_chunk_size: default_max_chunk_size(),
            log_level: default_log_level(),
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_path_extraction(mut self, enabled: bool) -> Self {
        self.path_extraction = enabled;
        self
    }

    pub fn with_max_chunk_size(mut self, max: u64) -> Self {
        self.max_chunk_size = max;
        self
    }

    pub fn with_log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Loads a JSON configuration file
    pub fn load(path: &Path) -> PaymentResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PaymentError::invalid_argument("config", path.display(), "cannot read config file")
                .caused_by(e.to_string())
        })?;

        let config: StoreConfig = serde_json::from_str(&content).map_err(|e| {
            PaymentError::invalid_argument("config", path.display(), "invalid config JSON")
                .caused_by(e.to_string())
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration. Performs no I/O.
    pub fn validate(&self) -> PaymentResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(PaymentError::invalid_argument(
                "path",
                "",
                "database path must not be empty",
            ));
        }
        if is_in_memory(&self.path) {
            return Err(PaymentError::invalid_argument(
                "path",
                self.path.display(),
                "in-memory databases aren't shared between operations",
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(PaymentError::invalid_argument(
                "busy_timeout_ms",
                0,
                "busy timeout must be positive",
            ));
        }
        if self.max_chunk_size == 0 {
            return Err(PaymentError::invalid_argument(
                "max_chunk_size",
                0,
                "max chunk size must be positive",
            ));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// The database path made absolute against the working directory.
    /// URIs are left to the engine.
    pub(crate) fn resolved_path(&self) -> PaymentResult<PathBuf> {
        if self.path.is_absolute() || is_uri(&self.path) {
            return Ok(self.path.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| {
            PaymentError::new(ErrorKind::UnexpectedSystemError)
                .arg("path", self.path.display())
                .call("std::env::current_dir", "")
                .caused_by(e.to_string())
        })?;
        Ok(cwd.join(&self.path))
    }
}

/// Returns true for `SQLite` URI filenames
pub(crate) fn is_uri(path: &Path) -> bool {
    path.to_str().map_or(false, |p| p.starts_with("file:"))
}

fn is_in_memory(path: &Path) -> bool {
    match path.to_str() {
        Some(":memory:") => true,
        Some(p) if is_uri(path) => p.starts_with("file::memory:") || p.contains("mode=memory"),
        _ => false,
    }
}
