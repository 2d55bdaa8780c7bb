//! Retry and backoff policy for per-file read failures.
//!
//! The default policy makes a single attempt: a file that fails to read is
//! reported, not retried. Callers that want resilience against transient
//! I/O errors (interrupted reads, NFS timeouts) configure more attempts.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_io_kind};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
