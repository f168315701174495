//! Error types.
use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a filter run.
#[derive(Debug, Error)]
pub enum Error {
    /// The filter was configured with a zero bit count or hash count.
    #[error("invalid filter parameters: {0}")]
    InvalidParameters(&'static str),

    /// Memory for the bit array or the reference set could not be reserved.
    #[error("unable to allocate {what}")]
    Alloc {
        /// The structure being allocated.
        what: &'static str,
        /// Allocator failure.
        #[source]
        source: TryReserveError,
    },

    /// A corpus file could not be opened.
    #[error("unable to open {}: {source}", path.display())]
    SourceUnavailable {
        /// Corpus path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A corpus file failed while being read.
    #[error("error reading {}: {source}", path.display())]
    Read {
        /// Corpus path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Verdict or report output could not be written.
    #[error("error writing output: {0}")]
    Write(#[source] io::Error),
}

impl Error {
    /// Whether this error is a resource exhaustion, as opposed to a bad
    /// input or configuration.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::Alloc { .. })
    }
}
