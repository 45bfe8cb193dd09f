//! Activity log storage: repository contract, file backend, codec and retry.
//!
//! # Responsibility
//! - Define the line-oriented repository contract used by the service.
//! - Keep file-system details inside the store boundary.
//!
//! # Invariants
//! - Each append is one write of one newline-terminated line.
//! - The containing directory is re-ensured on every append.
//! - A missing store reads as empty, never as an error.
//! - No cross-process locking: concurrent processes may interleave lines.

pub mod codec;
mod file_repo;
pub mod retry;

pub use file_repo::FileActivityLogRepository;

use crate::model::entry::EntryValidationError;
use retry::RetryPolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Store location used when callers do not configure one.
pub const DEFAULT_STORE_PATH: &str = "logs/task_manager.log";

pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Error for activity log writes and reads.
#[derive(Debug)]
pub enum ActivityLogError {
    /// Caller input rejected before any I/O.
    Validation(EntryValidationError),
    /// Append failed on every attempt; wraps the last failure.
    Persistence { attempts: u32, source: io::Error },
    /// Unrecoverable read failure (missing store is not one).
    Io(io::Error),
    /// Entry could not be serialized.
    Encode(serde_json::Error),
}

impl Display for ActivityLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence { attempts, source } => write!(
                f,
                "failed to write log entry after {attempts} attempts: {source}"
            ),
            Self::Io(err) => write!(f, "failed to read activity log: {err}"),
            Self::Encode(err) => write!(f, "failed to encode log entry: {err}"),
        }
    }
}

impl Error for ActivityLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for ActivityLogError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for ActivityLogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Explicit store configuration handed to the repository and service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub retry: RetryPolicy,
}

impl StoreConfig {
    /// Config for `path` with the default retry policy.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

/// Line-oriented append target for activity entries.
pub trait ActivityLogRepository {
    /// Appends `line` plus a newline in one write, creating parents as needed.
    fn append_line(&self, line: &str) -> io::Result<()>;
    /// Returns all lines in store order; empty when the store does not exist.
    fn read_lines(&self) -> io::Result<Vec<String>>;
    /// Human-readable location for diagnostics.
    fn location(&self) -> String;
}
