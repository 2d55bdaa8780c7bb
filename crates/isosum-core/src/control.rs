//! Scan cancellation: a shared abort token checked between chunks.
//!
//! Any clone of a `ScanControl` can request abort (e.g. the CLI's Ctrl-C
//! handler). In-flight hashers finish their current chunk, then stop with an
//! aborted result; tasks that have not started yet are reported as aborted
//! without opening their file.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    aborted: Arc<AtomicBool>,
}

impl ScanControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}
