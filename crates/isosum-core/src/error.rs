//! Error types for a scan.
//!
//! `ScanError` is fatal to the whole scan and is returned to the caller.
//! `FileAccessError` is local to one file: it is rendered into that file's
//! `HashResult` and never crosses a worker boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Target path is missing or is not a directory.
    #[error("'{}' is not a valid directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// Extension filter is empty or spans more than one dot-separated part.
    #[error("invalid extension filter '{extension}': expected a single extension such as .iso")]
    InvalidExtension { extension: String },

    /// Directory exists but could not be listed.
    #[error("failed to list directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A worker task was lost by the runtime (cancelled or shut down).
    #[error("hash worker task failed: {0}")]
    Join(String),

    /// `finalize` was called before every dispatched task reported.
    #[error("report finalized early: {observed} of {expected} results observed")]
    Incomplete { observed: usize, expected: usize },

    /// Writing a report line failed (e.g. stdout closed).
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum FileAccessError {
    #[error("{}: open failed: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: read failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: scan aborted", .path.display())]
    Aborted { path: PathBuf },

    #[error("{}: worker panicked", .path.display())]
    Panicked { path: PathBuf },
}

impl FileAccessError {
    /// Underlying I/O error kind, if any; used for retry classification.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            FileAccessError::Open { source, .. } | FileAccessError::Read { source, .. } => {
                Some(source.kind())
            }
            FileAccessError::Aborted { .. } | FileAccessError::Panicked { .. } => None,
        }
    }
}
