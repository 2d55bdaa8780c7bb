//! Classify file access errors into retry policy error kinds.

use std::io;

use super::policy::ErrorKind;
use crate::error::FileAccessError;

/// Classify an I/O error kind for retry decisions.
pub fn classify_io_kind(kind: io::ErrorKind) -> ErrorKind {
    match kind {
        io::ErrorKind::Interrupted
        | io::ErrorKind::TimedOut
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::UnexpectedEof => ErrorKind::Transient,
        _ => ErrorKind::Permanent,
    }
}

/// Classify a file access error. Aborts and panics are never retried.
pub fn classify(e: &FileAccessError) -> ErrorKind {
    e.io_kind()
        .map(classify_io_kind)
        .unwrap_or(ErrorKind::Permanent)
}
