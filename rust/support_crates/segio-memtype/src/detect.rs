//! `MemoryDetect`: mapping an address range to its memory placement.

use std::sync::Arc;

use segio_common::Result;

use crate::MemoryInfo;

/// A service that classifies memory regions.
///
/// Probes may be relatively expensive (driver calls, page table walks); callers of
/// this trait do not cache results, so an implementation that wants caching owns it.
///
/// # Errors
///
/// An implementation reports a hard probe failure with
/// [`ErrorKind::DetectionFailed`](segio_common::error::ErrorKind::DetectionFailed).
/// Any other error kind is treated as a service status and passed through to the
/// caller as-is.
pub trait MemoryDetect: Send + Sync {
    /// Returns the placement of the region `[address, address + length)`.
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo>;
}

impl<T: MemoryDetect + ?Sized> MemoryDetect for &T {
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo> {
        (**self).detect(address, length)
    }
}

impl<T: MemoryDetect + ?Sized> MemoryDetect for Box<T> {
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo> {
        (**self).detect(address, length)
    }
}

impl<T: MemoryDetect + ?Sized> MemoryDetect for Arc<T> {
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo> {
        (**self).detect(address, length)
    }
}

/// Reports every region as host memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostOnlyDetect;

impl MemoryDetect for HostOnlyDetect {
    fn detect(&self, _address: *const u8, _length: usize) -> Result<MemoryInfo> {
        Ok(MemoryInfo::host())
    }
}
