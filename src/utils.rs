//! Utility helpers for page size queries and safe range calculations.

use crate::errors::{MmapEqError, Result};

/// Get the system page size in bytes.
#[must_use]
pub fn page_size() -> usize {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            windows_page_size()
        } else {
            unix_page_size()
        }
    }
}

#[cfg(target_os = "windows")]
fn windows_page_size() -> usize {
    use std::mem::MaybeUninit;
    #[allow(non_snake_case)]
    #[repr(C)]
    struct SYSTEM_INFO {
        wProcessorArchitecture: u16,
        wReserved: u16,
        dwPageSize: u32,
        lpMinimumApplicationAddress: *mut core::ffi::c_void,
        lpMaximumApplicationAddress: *mut core::ffi::c_void,
        dwActiveProcessorMask: usize,
        dwNumberOfProcessors: u32,
        dwProcessorType: u32,
        dwAllocationGranularity: u32,
        wProcessorLevel: u16,
        wProcessorRevision: u16,
    }
    extern "system" {
        fn GetSystemInfo(lpSystemInfo: *mut SYSTEM_INFO);
    }
    let mut sysinfo = MaybeUninit::<SYSTEM_INFO>::uninit();
    unsafe {
        GetSystemInfo(sysinfo.as_mut_ptr());
        let s = sysinfo.assume_init();
        s.dwPageSize as usize
    }
}

#[cfg(not(target_os = "windows"))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unix_page_size() -> usize {
    // SAFETY: sysconf with _SC_PAGESIZE is safe to call.
    unsafe {
        let page_size = libc::sysconf(libc::_SC_PAGESIZE);
        // Page size should always be positive and fit in usize
        page_size.max(0) as usize
    }
}

/// Ensure the requested [offset, offset+len) range is within [0, total).
/// Returns `Ok(())` if valid; otherwise an `OutOfBounds` error.
///
/// # Errors
///
/// Returns `MmapEqError::OutOfBounds` if the range exceeds bounds.
pub fn ensure_in_bounds(offset: u64, len: u64, total: u64) -> Result<()> {
    if offset > total {
        return Err(MmapEqError::OutOfBounds { offset, len, total });
    }
    let end = offset.saturating_add(len);
    if end > total {
        return Err(MmapEqError::OutOfBounds { offset, len, total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_nonzero_power_of_two() {
        let page = page_size();
        assert!(page > 0);
        assert!(page.is_power_of_two());
    }

    #[test]
    fn bounds_accept_exact_fit() {
        assert!(ensure_in_bounds(0, 100, 100).is_ok());
        assert!(ensure_in_bounds(50, 50, 100).is_ok());
        assert!(ensure_in_bounds(100, 0, 100).is_ok());
    }

    #[test]
    fn bounds_reject_overrun() {
        assert!(ensure_in_bounds(0, 101, 100).is_err());
        assert!(ensure_in_bounds(101, 0, 100).is_err());
        // Offset near u64::MAX must not wrap around.
        assert!(ensure_in_bounds(u64::MAX, 1, 100).is_err());
    }
}
