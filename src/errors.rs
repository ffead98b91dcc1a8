//! Crate-specific error types for mmap-eq.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for mmap-eq operations.
pub type Result<T> = std::result::Result<T, MmapEqError>;

/// The phase of a comparison during which an I/O operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPhase {
    /// Querying file metadata (size, file type).
    Metadata,
    /// Opening a read-only handle.
    Open,
    /// Creating a memory mapping over a window of the file.
    Map,
    /// Closing a file handle.
    Close,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            IoPhase::Metadata => "metadata query",
            IoPhase::Open => "open",
            IoPhase::Map => "mapping",
            IoPhase::Close => "close",
        };
        f.write_str(phase)
    }
}

/// Error type covering input validation, I/O, and mapping-release issues.
#[derive(Debug, Error)]
pub enum MmapEqError {
    /// An argument path does not refer to a regular file.
    #[error("not a regular file: {}", .0.display())]
    NotRegularFile(PathBuf),

    /// The comparator was configured with an unusable maximum window size.
    #[error("invalid maximum window size: {0}")]
    InvalidWindowSize(u64),

    /// A requested window exceeds the bounds of the underlying file.
    #[error("window out of bounds: offset={offset}, len={len}, total={total}")]
    OutOfBounds {
        /// Requested window offset.
        offset: u64,
        /// Requested window length.
        len: u64,
        /// Total size of the file.
        total: u64,
    },

    /// An I/O operation on one of the input files failed.
    #[error("{phase} failed for {}: {source}", path.display())]
    Io {
        /// Path of the file the operation failed on.
        path: PathBuf,
        /// Phase of the comparison the failure occurred in.
        phase: IoPhase,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Releasing a native memory mapping did not succeed.
    ///
    /// The mapping may still be live, in which case the file remains locked
    /// against deletion or rewriting until the process exits.
    #[error("failed to release mapping for {} (file may still be locked): {source}", path.display())]
    Reclaim {
        /// Path of the file whose mapping could not be released.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },
}
