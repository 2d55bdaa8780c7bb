//! Whole-scan lifecycle: enumerate → dispatch → aggregate.
//!
//! `Idle → Enumerating → Dispatching → Aggregating → Done`, with
//! `Enumerating → Done` when nothing matches and `→ Failed` when the target
//! directory is invalid. Only enumeration failures escalate to the caller;
//! per-file failures are reported as lines and counted in the summary.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::algorithm::HashAlgorithm;
use crate::control::ScanControl;
use crate::dispatch::WorkDispatcher;
use crate::enumerate::{self, DEFAULT_EXTENSION};
use crate::error::ScanError;
use crate::hasher::StreamHasher;
use crate::progress::{NoProgress, ProgressObserver};
use crate::report::{format_summary, ReportAggregator};
use crate::retry::RetryPolicy;
use crate::task::BatchSummary;

/// Parameters for one directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub directory: PathBuf,
    /// Extension filter, with or without the leading dot.
    pub extension: String,
    /// Read chunk size in bytes; `None` uses the default.
    pub chunk_size: Option<usize>,
    /// Maximum files hashed at once; `None` means no explicit cap.
    pub max_concurrent: Option<usize>,
    pub algorithm: HashAlgorithm,
    pub retry: RetryPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            chunk_size: None,
            max_concurrent: None,
            algorithm: HashAlgorithm::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Enumerating,
    Dispatching,
    Aggregating,
    Done,
    Failed,
}

pub struct Scanner {
    options: ScanOptions,
    observer: Arc<dyn ProgressObserver>,
    control: ScanControl,
    phase: ScanPhase,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            observer: Arc::new(NoProgress),
            control: ScanControl::new(),
            phase: ScanPhase::Idle,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_control(mut self, control: ScanControl) -> Self {
        self.control = control;
        self
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    fn transition(&mut self, next: ScanPhase) {
        tracing::debug!("scan phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Run the scan, writing report lines and the summary line to `out`.
    pub async fn run<W: Write>(&mut self, mut out: W) -> Result<BatchSummary, ScanError> {
        let dir = self.options.directory.clone();
        self.transition(ScanPhase::Enumerating);
        let tasks = match enumerate::enumerate(&dir, &self.options.extension) {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!("{}", e);
                self.transition(ScanPhase::Failed);
                return Err(e);
            }
        };

        if tasks.is_empty() {
            tracing::warn!(
                "no files with extension {} found in {}",
                self.options.extension,
                dir.display()
            );
            let summary = BatchSummary::default();
            writeln!(out, "{}", format_summary(&summary)).map_err(ScanError::Output)?;
            self.transition(ScanPhase::Done);
            return Ok(summary);
        }

        let total = tasks.len();
        tracing::info!(
            "hashing {} file(s) in {} with {}",
            total,
            dir.display(),
            self.options.algorithm.label()
        );

        let hasher = StreamHasher::new(self.options.algorithm, self.options.chunk_size)
            .with_retry(self.options.retry)
            .with_observer(Arc::clone(&self.observer))
            .with_control(self.control.clone());
        let dispatcher = WorkDispatcher::new(hasher, self.options.max_concurrent);
        let mut aggregator = ReportAggregator::new(&mut out, self.options.algorithm, total);

        self.transition(ScanPhase::Dispatching);
        let dispatched = dispatcher.dispatch(tasks, |result| aggregator.observe(&result)).await;
        if let Err(e) = dispatched {
            self.transition(ScanPhase::Failed);
            return Err(e);
        }

        self.transition(ScanPhase::Aggregating);
        let summary = aggregator.finalize()?;
        writeln!(out, "{}", format_summary(&summary)).map_err(ScanError::Output)?;
        tracing::info!(
            "batch complete: {}/{} succeeded, {} failed",
            summary.succeeded,
            summary.total,
            summary.failed()
        );
        if self.control.is_aborted() {
            tracing::warn!("scan was aborted before all files were hashed");
        }
        self.transition(ScanPhase::Done);
        Ok(summary)
    }
}

/// Run one scan with the given observer and control token.
pub async fn run_scan<W: Write>(
    options: ScanOptions,
    observer: Arc<dyn ProgressObserver>,
    control: ScanControl,
    out: W,
) -> Result<BatchSummary, ScanError> {
    Scanner::new(options)
        .with_observer(observer)
        .with_control(control)
        .run(out)
        .await
}
