//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::error::FileAccessError;

/// Runs `f` until it succeeds or the retry policy says to stop.
/// On a retryable failure, sleeps for the backoff duration then tries again;
/// each attempt starts from scratch.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, FileAccessError>
where
    F: FnMut() -> Result<T, FileAccessError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, delay_ms = d.as_millis() as u64, "{}; retrying", e);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::time::Duration;

    fn transient() -> FileAccessError {
        FileAccessError::Read {
            path: PathBuf::from("a.iso"),
            source: io::Error::new(io::ErrorKind::Interrupted, "interrupted"),
        }
    }

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            ..RetryPolicy::with_retries(retries)
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let out = run_with_retry(&fast_policy(3), || {
            calls += 1;
            if calls < 3 {
                Err(transient())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(out.unwrap(), 3);
    }

    #[test]
    fn single_attempt_by_default() {
        let mut calls = 0;
        let out: Result<(), _> = run_with_retry(&RetryPolicy::default(), || {
            calls += 1;
            Err(transient())
        });
        assert!(out.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let out: Result<(), _> = run_with_retry(&fast_policy(2), || {
            calls += 1;
            Err(transient())
        });
        assert!(out.is_err());
        assert_eq!(calls, 3);
    }
}
