//! Bounded read-only mapped windows with deterministic release.

use std::fs::File;
use std::io;
use std::path::Path;

use log::trace;
use memmap2::{Mmap, MmapOptions};

use crate::errors::{IoPhase, MmapEqError, Result};
use crate::utils::ensure_in_bounds;

/// Read-only view over a contiguous byte range `[offset, offset + len)`
/// of one file, backed by a native memory mapping.
///
/// A window is a transient, call-scoped resource: it is created, read, and
/// then released via [`reclaim`](MappedWindow::reclaim) before the caller
/// moves on. `reclaim` unmaps synchronously and reports failure; dropping an
/// unreclaimed window (an error exit path) still unmaps synchronously via
/// the mapping's own destructor, just without an error channel.
///
/// A live mapping holds the underlying file locked against deletion or
/// rewriting on some platforms, which is why release is explicit and
/// immediate rather than deferred.
#[derive(Debug)]
pub struct MappedWindow<'a> {
    map: Option<Mmap>,
    path: &'a Path,
    offset: u64,
}

impl<'a> MappedWindow<'a> {
    /// Map the `[offset, offset + len)` range of `file` read-only.
    ///
    /// `total` is the file's byte length; the requested range must lie
    /// within it and `len` must be non-zero (a zero-length mapping is not
    /// representable at the platform level).
    ///
    /// # Errors
    ///
    /// Returns `MmapEqError::OutOfBounds` if the range exceeds `total` or
    /// `len` is zero.
    /// Returns `MmapEqError::Io` (phase `Map`) if the mapping call fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn map(file: &File, path: &'a Path, offset: u64, len: u64, total: u64) -> Result<Self> {
        ensure_in_bounds(offset, len, total)?;
        if len == 0 {
            return Err(MmapEqError::OutOfBounds { offset, len, total });
        }
        // SAFETY: the file is open read-only and the range was validated
        // against its length. memmap2 handles platform-specific mmap details.
        let map = unsafe { MmapOptions::new().offset(offset).len(len as usize).map(file) }
            .map_err(|source| MmapEqError::Io {
                path: path.to_path_buf(),
                phase: IoPhase::Map,
                source,
            })?;
        trace!(
            "mapped window [{offset}, {}) of {}",
            offset + len,
            path.display()
        );
        Ok(Self {
            map: Some(map),
            path,
            offset,
        })
    }

    /// The mapped bytes. Empty after the window has been reclaimed.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Byte offset of this window within the file.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of the window in bytes (zero once reclaimed).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    /// Whether the window holds no mapped bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_none()
    }

    /// Synchronously release the native mapping underlying this window.
    ///
    /// Idempotent: calling this on an already-reclaimed window is a no-op.
    /// On Unix the region is released with `munmap` so a platform refusal
    /// is observable; on other platforms the mapping's destructor performs
    /// the (still synchronous) unmap without an error channel.
    ///
    /// # Errors
    ///
    /// Returns `MmapEqError::Reclaim` if the platform refuses to release
    /// the mapping, in which case the file may remain locked.
    pub fn reclaim(&mut self) -> Result<()> {
        let Some(map) = self.map.take() else {
            return Ok(());
        };
        trace!("reclaiming window at {} of {}", self.offset, self.path.display());
        release_now(map).map_err(|source| MmapEqError::Reclaim {
            path: self.path.to_path_buf(),
            source,
        })
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn release_now(map: Mmap) -> io::Result<()> {
            let len = map.len();
            if len == 0 {
                return Ok(());
            }
            // memmap2 aligns the real mapping down to a page boundary and
            // widens the length to compensate; reconstruct that range so
            // the munmap below covers exactly what the kernel mapped.
            let ptr = map.as_ptr();
            let adjust = ptr as usize % crate::utils::page_size();
            let addr = ptr.wrapping_sub(adjust) as *mut libc::c_void;
            std::mem::forget(map);
            // SAFETY: addr/len describe the full region mapped for this
            // window, and the mapping's own destructor was suppressed
            // above, so the region is unmapped exactly once.
            if unsafe { libc::munmap(addr, len + adjust) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    } else {
        fn release_now(map: Mmap) -> io::Result<()> {
            // UnmapViewOfFile runs synchronously inside the mapping's
            // destructor; the platform exposes no error once the view is
            // established.
            drop(map);
            Ok(())
        }
    }
}
