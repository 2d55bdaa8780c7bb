//! Bounded-parallel fan-out of the stream hasher over a batch of files.
//!
//! Keeps up to `max_concurrent` hashers running at once on the blocking
//! pool; when one finishes, its result is handed to the caller and the next
//! file is started until the batch is drained. Results arrive in completion
//! order. A failing (or panicking) hasher yields a failure result for its
//! own file and never affects its siblings.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::task::JoinSet;

use crate::error::{FileAccessError, ScanError};
use crate::hasher::StreamHasher;
use crate::task::{FileTask, HashResult};

pub struct WorkDispatcher {
    hasher: StreamHasher,
    max_concurrent: Option<usize>,
}

impl WorkDispatcher {
    /// `max_concurrent = None` spawns every file at once (still bounded by
    /// the runtime's blocking pool).
    pub fn new(hasher: StreamHasher, max_concurrent: Option<usize>) -> Self {
        Self {
            hasher,
            max_concurrent,
        }
    }

    pub fn hasher(&self) -> &StreamHasher {
        &self.hasher
    }

    fn limit(&self) -> usize {
        self.max_concurrent.map(|n| n.max(1)).unwrap_or(usize::MAX)
    }

    /// Hash every task, calling `on_result` once per task as results
    /// complete. Returns the number of results delivered, which always
    /// equals `tasks.len()` on success.
    pub async fn dispatch<F>(
        &self,
        tasks: Vec<FileTask>,
        mut on_result: F,
    ) -> Result<usize, ScanError>
    where
        F: FnMut(HashResult) -> Result<(), ScanError>,
    {
        let limit = self.limit();
        let mut pending = tasks.into_iter();
        let mut join_set: JoinSet<HashResult> = JoinSet::new();
        let mut delivered = 0usize;

        loop {
            while join_set.len() < limit {
                let Some(task) = pending.next() else {
                    break;
                };
                let hasher = self.hasher.clone();
                tracing::debug!("dispatching {}", task.path.display());
                join_set.spawn_blocking(move || hash_isolated(&hasher, task));
            }

            let Some(res) = join_set.join_next().await else {
                break;
            };
            let result = res.map_err(|e| ScanError::Join(e.to_string()))?;
            delivered += 1;
            on_result(result)?;
        }

        Ok(delivered)
    }

    /// Convenience wrapper collecting results in completion order.
    pub async fn dispatch_collect(
        &self,
        tasks: Vec<FileTask>,
    ) -> Result<Vec<HashResult>, ScanError> {
        let mut results = Vec::with_capacity(tasks.len());
        self.dispatch(tasks, |r| {
            results.push(r);
            Ok(())
        })
        .await?;
        Ok(results)
    }
}

/// Run the hasher for one task, turning a panic into a failure result so the
/// one-result-per-task guarantee holds.
fn hash_isolated(hasher: &StreamHasher, task: FileTask) -> HashResult {
    match panic::catch_unwind(AssertUnwindSafe(|| hasher.hash(&task))) {
        Ok(result) => result,
        Err(_) => {
            let err = FileAccessError::Panicked {
                path: task.path.clone(),
            };
            tracing::error!("{}", err);
            let result = HashResult::failure(task.path, err, Duration::ZERO);
            hasher.observer().on_finish(&result);
            result
        }
    }
}
