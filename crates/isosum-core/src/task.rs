//! Per-file work items and their results.
//!
//! A `FileTask` is produced by the enumerator and consumed by the hasher,
//! which turns it into exactly one `HashResult`. `BatchSummary` is what the
//! report aggregator hands back once every result has arrived.

use std::path::PathBuf;
use std::time::Duration;

/// A candidate file selected for hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    /// Byte count at scan time (the file may change before it is read).
    pub size: u64,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Final path component for display; falls back to the full path.
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// Outcome of hashing one `FileTask`.
#[derive(Debug, Clone)]
pub struct HashResult {
    pub path: PathBuf,
    /// Lowercase hex digest; `None` when the file could not be read.
    pub digest: Option<String>,
    /// Wall-clock time from the first read to finalize (or to the failure).
    pub elapsed: Duration,
    /// Failure description naming the path and underlying cause.
    pub error: Option<String>,
}

impl HashResult {
    pub fn success(path: PathBuf, digest: String, elapsed: Duration) -> Self {
        Self {
            path,
            digest: Some(digest),
            elapsed,
            error: None,
        }
    }

    pub fn failure(path: PathBuf, error: impl ToString, elapsed: Duration) -> Self {
        Self {
            path,
            digest: None,
            elapsed,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.digest.is_some()
    }

    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// Aggregate counts for one directory scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_last_component() {
        let task = FileTask::new("/srv/images/debian-12.iso", 10);
        assert_eq!(task.file_name(), "debian-12.iso");
    }

    #[test]
    fn summary_display_and_failed() {
        let s = BatchSummary {
            total: 5,
            succeeded: 3,
        };
        assert_eq!(s.to_string(), "3/5");
        assert_eq!(s.failed(), 2);
    }

    #[test]
    fn failure_has_no_digest() {
        let r = HashResult::failure(PathBuf::from("x.iso"), "x.iso: boom", Duration::ZERO);
        assert!(!r.is_success());
        assert_eq!(r.error.as_deref(), Some("x.iso: boom"));
    }
}
