//! Per-file report lines and the batch summary.
//!
//! Line format: `<file name padded to 40> <ALGO>: <hex digest>`, or
//! `<file name padded to 40> ERROR: <reason>` when the file failed.

use std::io::Write;

use crate::algorithm::HashAlgorithm;
use crate::error::ScanError;
use crate::task::{BatchSummary, HashResult};

/// Column width the file name is padded to.
pub const NAME_WIDTH: usize = 40;

pub fn format_line(result: &HashResult, algorithm: HashAlgorithm) -> String {
    let name = result.file_name();
    match (&result.digest, &result.error) {
        (Some(digest), _) => format!(
            "{:<width$} {}: {}",
            name,
            algorithm.label(),
            digest,
            width = NAME_WIDTH
        ),
        (None, Some(error)) => format!("{:<width$} ERROR: {}", name, error, width = NAME_WIDTH),
        (None, None) => format!("{:<width$} ERROR: unknown failure", name, width = NAME_WIDTH),
    }
}

pub fn format_summary(summary: &BatchSummary) -> String {
    format!("Summary: {} files hashed successfully", summary)
}

/// Consumes results in completion order, writes one line per result, and
/// counts successes.
pub struct ReportAggregator<W: Write> {
    out: W,
    algorithm: HashAlgorithm,
    expected: usize,
    observed: usize,
    succeeded: usize,
}

impl<W: Write> ReportAggregator<W> {
    /// `expected` is the number of dispatched tasks; `finalize` refuses to
    /// summarize until that many results have been observed.
    pub fn new(out: W, algorithm: HashAlgorithm, expected: usize) -> Self {
        Self {
            out,
            algorithm,
            expected,
            observed: 0,
            succeeded: 0,
        }
    }

    pub fn observe(&mut self, result: &HashResult) -> Result<(), ScanError> {
        self.observed += 1;
        if result.is_success() {
            self.succeeded += 1;
        }
        writeln!(self.out, "{}", format_line(result, self.algorithm))
            .map_err(ScanError::Output)?;
        self.out.flush().map_err(ScanError::Output)
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn is_complete(&self) -> bool {
        self.observed >= self.expected
    }

    pub fn finalize(self) -> Result<BatchSummary, ScanError> {
        if !self.is_complete() {
            return Err(ScanError::Incomplete {
                observed: self.observed,
                expected: self.expected,
            });
        }
        if self.observed > self.expected {
            tracing::warn!(
                "observed {} results for {} dispatched files",
                self.observed,
                self.expected
            );
        }
        Ok(BatchSummary {
            total: self.observed,
            succeeded: self.succeeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn ok(name: &str, digest: &str) -> HashResult {
        HashResult::success(PathBuf::from(name), digest.to_string(), Duration::ZERO)
    }

    fn failed(name: &str) -> HashResult {
        HashResult::failure(
            PathBuf::from(name),
            format!("{}: open failed: permission denied", name),
            Duration::ZERO,
        )
    }

    #[test]
    fn success_line_is_padded() {
        let line = format_line(&ok("/isos/a.iso", "abcd"), HashAlgorithm::Blake2b);
        assert_eq!(line, format!("{:<40} BLAKE2b: abcd", "a.iso"));
        assert_eq!(line.find("BLAKE2b"), Some(41));
    }

    #[test]
    fn long_names_are_not_truncated() {
        let name = "x".repeat(50) + ".iso";
        let line = format_line(&ok(&name, "00"), HashAlgorithm::Sha256);
        assert_eq!(line, format!("{} SHA256: 00", name));
    }

    #[test]
    fn failure_line_carries_reason() {
        let line = format_line(&failed("b.iso"), HashAlgorithm::Blake2b);
        assert!(line.starts_with("b.iso"));
        assert!(line.contains("ERROR: b.iso: open failed: permission denied"));
    }

    #[test]
    fn counts_and_lines() {
        let mut out = Vec::new();
        let mut agg = ReportAggregator::new(&mut out, HashAlgorithm::Blake2b, 3);
        agg.observe(&ok("a.iso", "aa")).unwrap();
        agg.observe(&failed("b.iso")).unwrap();
        agg.observe(&ok("c.iso", "cc")).unwrap();
        let summary = agg.finalize().unwrap();
        assert_eq!(summary, BatchSummary { total: 3, succeeded: 2 });
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn finalize_before_all_results_is_error() {
        let mut agg = ReportAggregator::new(Vec::new(), HashAlgorithm::Blake2b, 2);
        agg.observe(&ok("a.iso", "aa")).unwrap();
        let err = agg.finalize().unwrap_err();
        assert!(matches!(err, ScanError::Incomplete { observed: 1, expected: 2 }));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_write_failure_is_output_error() {
        let mut agg = ReportAggregator::new(BrokenPipe, HashAlgorithm::Blake2b, 1);
        let err = agg.observe(&ok("a.iso", "aa")).unwrap_err();
        match err {
            ScanError::Output(e) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("expected Output error, got {:?}", other),
        }
    }

    #[test]
    fn empty_batch_summary() {
        let agg = ReportAggregator::new(Vec::new(), HashAlgorithm::Blake2b, 0);
        let s = agg.finalize().unwrap();
        assert_eq!(format_summary(&s), "Summary: 0/0 files hashed successfully");
    }
}
