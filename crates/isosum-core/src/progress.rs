//! Progress reporting for file hashing (bytes done, rate, ETA).
//!
//! The hasher calls a `ProgressObserver` after every chunk. Observers are a
//! side channel only; nothing they do affects the digest. The CLI plugs in a
//! progress bar in verbose mode and `NoProgress` otherwise.

use crate::task::{FileTask, HashResult};

/// Snapshot of hashing progress for one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileProgress {
    /// Bytes folded into the hash so far.
    pub bytes_done: u64,
    /// File size at scan time.
    pub total_bytes: u64,
    /// Elapsed time since the first read (seconds).
    pub elapsed_secs: f64,
}

impl FileProgress {
    /// Hash rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if rate is 0 or already done).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0]. A file that grew past its scanned
    /// size stays at 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }
}

/// Receives per-file progress events. Called from worker threads, so
/// implementations must be cheap and thread-safe.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, _task: &FileTask) {}

    fn on_chunk(&self, _task: &FileTask, _progress: &FileProgress) {}

    fn on_finish(&self, _result: &HashResult) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
