//! Streaming file hasher.
//!
//! Reads one file in fixed-size chunks and folds each chunk into the hash
//! state as soon as it is read, so memory use is bounded by the chunk size
//! regardless of file size. Any I/O failure is contained: it becomes a
//! `HashResult` without a digest, never an error for the caller.

use std::fs::File;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::algorithm::{HashAlgorithm, HashState};
use crate::control::ScanControl;
use crate::error::FileAccessError;
use crate::progress::{FileProgress, NoProgress, ProgressObserver};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::task::{FileTask, HashResult};

/// Chunk size used when none (or zero) is requested.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Resolve a requested chunk size, falling back to the default for `None` or 0.
pub fn effective_chunk_size(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => DEFAULT_CHUNK_SIZE,
    }
}

/// Hashes one file at a time. Cheap to clone; each worker gets its own copy
/// and opens its own file handle.
#[derive(Clone)]
pub struct StreamHasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
    retry: RetryPolicy,
    observer: Arc<dyn ProgressObserver>,
    control: ScanControl,
}

impl StreamHasher {
    pub fn new(algorithm: HashAlgorithm, chunk_size: Option<usize>) -> Self {
        Self {
            algorithm,
            chunk_size: effective_chunk_size(chunk_size),
            retry: RetryPolicy::default(),
            observer: Arc::new(NoProgress),
            control: ScanControl::new(),
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

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn observer(&self) -> &Arc<dyn ProgressObserver> {
        &self.observer
    }

    /// Hash the file behind `task`. Always returns exactly one result.
    pub fn hash(&self, task: &FileTask) -> HashResult {
        // Files not started before an abort get no start event or bar.
        if self.control.is_aborted() {
            let err = FileAccessError::Aborted {
                path: task.path.clone(),
            };
            tracing::debug!("{}", err);
            let result = HashResult::failure(task.path.clone(), err, Duration::ZERO);
            self.observer.on_finish(&result);
            return result;
        }

        let name = task.file_name();
        tracing::info!("processing file: {} ({} bytes)", name, task.size);
        self.observer.on_start(task);

        let start = Instant::now();
        let outcome = run_with_retry(&self.retry, || self.hash_once(task, start));
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(digest) => {
                tracing::info!(
                    "completed: {} | size: {} bytes | time: {:.2}s",
                    name,
                    task.size,
                    elapsed.as_secs_f64()
                );
                HashResult::success(task.path.clone(), digest, elapsed)
            }
            Err(e) => {
                tracing::error!("{}", e);
                HashResult::failure(task.path.clone(), e, elapsed)
            }
        };
        self.observer.on_finish(&result);
        result
    }

    fn hash_once(&self, task: &FileTask, start: Instant) -> Result<String, FileAccessError> {
        if self.control.is_aborted() {
            return Err(FileAccessError::Aborted {
                path: task.path.clone(),
            });
        }
        let mut file = File::open(&task.path).map_err(|source| FileAccessError::Open {
            path: task.path.clone(),
            source,
        })?;
        self.hash_reader(&mut file, task, start)
    }

    /// Fold everything `reader` yields into a fresh hash state, reporting
    /// progress against `task` after every chunk.
    pub fn hash_reader<R: Read>(
        &self,
        reader: &mut R,
        task: &FileTask,
        start: Instant,
    ) -> Result<String, FileAccessError> {
        let mut state = HashState::new(self.algorithm);
        let mut buf = vec![0u8; self.chunk_size];
        let mut bytes_done = 0u64;
        let mut chunk_count = 0u64;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(FileAccessError::Read {
                        path: task.path.clone(),
                        source,
                    })
                }
            };
            state.update(&buf[..n]);
            bytes_done += n as u64;
            chunk_count += 1;
            tracing::debug!(
                "processed chunk {} of {}: {} bytes",
                chunk_count,
                task.file_name(),
                n
            );

            self.observer.on_chunk(
                task,
                &FileProgress {
                    bytes_done,
                    total_bytes: task.size,
                    elapsed_secs: start.elapsed().as_secs_f64(),
                },
            );

            if self.control.is_aborted() {
                return Err(FileAccessError::Aborted {
                    path: task.path.clone(),
                });
            }
        }

        Ok(state.finalize_hex())
    }
}
