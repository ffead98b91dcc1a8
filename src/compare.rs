//! Chunked, memory-mapped comparison of two files' contents.

use std::fs::{self, File};
use std::path::Path;

use log::{debug, trace};

use crate::errors::{IoPhase, MmapEqError, Result};
use crate::window::MappedWindow;

/// Default upper bound on a single mapped window, in bytes (1 GiB).
///
/// Kept below 2^31 because several platforms cap a single file mapping at a
/// 32-bit signed size; that cap, not the comparison algorithm, is what
/// forces the windowed design. Platforms with larger mapping limits can
/// raise the bound via [`ContentComparator::with_max_window`].
pub const DEFAULT_MAX_WINDOW: u64 = 1 << 30;

/// Byte-for-byte file content comparator.
///
/// Maps both files in bounded windows and compares them sequentially,
/// short-circuiting at the first differing byte. Windows are reclaimed and
/// handles closed on every exit path, so neither input file is left locked
/// after the call returns.
///
/// # Examples
///
/// ```no_run
/// use mmap_eq::ContentComparator;
///
/// let comparator = ContentComparator::new();
/// if comparator.contents_equal("a.mkv", "b.mkv")? {
///     println!("duplicates");
/// }
/// # Ok::<(), mmap_eq::MmapEqError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContentComparator {
    max_window: u64,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentComparator {
    /// Comparator with the default maximum window size
    /// ([`DEFAULT_MAX_WINDOW`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_window: DEFAULT_MAX_WINDOW,
        }
    }

    /// Comparator with a caller-chosen maximum window size in bytes.
    ///
    /// # Errors
    ///
    /// Returns `MmapEqError::InvalidWindowSize` if `max_window` is zero.
    pub fn with_max_window(max_window: u64) -> Result<Self> {
        if max_window == 0 {
            return Err(MmapEqError::InvalidWindowSize(max_window));
        }
        Ok(Self { max_window })
    }

    /// Configured maximum window size in bytes.
    #[must_use]
    pub fn max_window(&self) -> u64 {
        self.max_window
    }

    /// Whether the files at `path1` and `path2` have byte-identical
    /// contents.
    ///
    /// Differently sized files are decided from metadata alone, without
    /// opening either file's content. Equally sized files (including two
    /// empty files, which are trivially equal) are compared window by
    /// window until the first differing byte or the end of both files.
    ///
    /// # Errors
    ///
    /// Returns `MmapEqError::NotRegularFile` if either path is not a
    /// regular file (checked before any handle is opened).
    /// Returns `MmapEqError::Io` for open, metadata, mapping, or close
    /// failures, carrying the offending path and phase.
    /// Returns `MmapEqError::Reclaim` if a window's mapping could not be
    /// released, in which case that file may remain locked.
    pub fn contents_equal<P: AsRef<Path>>(&self, path1: P, path2: P) -> Result<bool> {
        let path1 = path1.as_ref();
        let path2 = path2.as_ref();

        let size1 = regular_file_len(path1)?;
        let size2 = regular_file_len(path2)?;
        if size1 != size2 {
            debug!("sizes differ ({size1} vs {size2} bytes), contents cannot be equal");
            return Ok(false);
        }
        if size1 == 0 {
            return Ok(true);
        }

        let file1 = open_ro(path1)?;
        let file2 = open_ro(path2)?;

        // Both handles are closed on every exit path. Each close is
        // attempted even if the comparison or the sibling close failed;
        // the first error encountered is the one surfaced.
        let outcome = self.compare_windows(&file1, path1, &file2, path2, size1);
        let close1 = close_now(file1, path1);
        let close2 = close_now(file2, path2);
        let equal = outcome?;
        close1?;
        close2?;
        Ok(equal)
    }

    fn compare_windows(
        &self,
        file1: &File,
        path1: &Path,
        file2: &File,
        path2: &Path,
        total: u64,
    ) -> Result<bool> {
        let mut position = 0u64;
        while position < total {
            let len = self.max_window.min(total - position);
            trace!("comparing window [{position}, {}) of {total}", position + len);
            let mut window1 = MappedWindow::map(file1, path1, position, len, total)?;
            let mut window2 = MappedWindow::map(file2, path2, position, len, total)?;

            let mismatch = first_mismatch(window1.as_slice(), window2.as_slice());

            // Both windows are released before the position advances or the
            // call returns; the second reclaim is attempted even if the
            // first one fails.
            let reclaim1 = window1.reclaim();
            let reclaim2 = window2.reclaim();
            reclaim1?;
            reclaim2?;

            if let Some(at) = mismatch {
                debug!("contents diverge at byte {}", position + at as u64);
                return Ok(false);
            }
            position += len;
        }
        Ok(true)
    }
}

/// Compare two files for byte-identical contents with the default window
/// size. Convenience wrapper around [`ContentComparator`].
///
/// # Errors
///
/// Returns errors from [`ContentComparator::contents_equal`].
pub fn contents_equal<P: AsRef<Path>>(path1: P, path2: P) -> Result<bool> {
    ContentComparator::new().contents_equal(path1, path2)
}

// Sequential positional reads rather than a bulk slice equality: the scan
// stops at the first differing byte instead of materializing both windows
// in full before answering.
fn first_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter().zip(b.iter()).position(|(x, y)| x != y)
}

fn regular_file_len(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path).map_err(|source| MmapEqError::Io {
        path: path.to_path_buf(),
        phase: IoPhase::Metadata,
        source,
    })?;
    if !meta.is_file() {
        return Err(MmapEqError::NotRegularFile(path.to_path_buf()));
    }
    Ok(meta.len())
}

fn open_ro(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| MmapEqError::Io {
        path: path.to_path_buf(),
        phase: IoPhase::Open,
        source,
    })
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn close_now(file: File, path: &Path) -> Result<()> {
            use std::os::unix::io::IntoRawFd;
            let fd = file.into_raw_fd();
            // SAFETY: into_raw_fd transferred ownership of the descriptor,
            // so it is closed exactly once, here.
            if unsafe { libc::close(fd) } != 0 {
                return Err(MmapEqError::Io {
                    path: path.to_path_buf(),
                    phase: IoPhase::Close,
                    source: std::io::Error::last_os_error(),
                });
            }
            Ok(())
        }
    } else {
        fn close_now(file: File, path: &Path) -> Result<()> {
            // File's destructor closes synchronously; std exposes no error
            // for an implicit close on this platform.
            let _ = path;
            drop(file);
            Ok(())
        }
    }
}
