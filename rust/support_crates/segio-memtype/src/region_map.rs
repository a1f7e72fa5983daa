//! A registry of memory regions with known placement.

use std::{collections::BTreeMap, ops::Range, sync::RwLock};

use segio_common::{Result, error::Error, verify_arg};

use crate::{MemoryDetect, MemoryInfo};

/// A thread-safe registry of non-overlapping address ranges and their placement.
///
/// Allocators of non-host memory register their regions here; the map then serves
/// as a [`MemoryDetect`] implementation:
///
/// *   a probe that falls entirely inside a registered region reports that region's
///     [`MemoryInfo`];
/// *   a probe that touches no registered region reports host memory;
/// *   a probe that straddles the boundary of a registered region fails with
///     `DetectionFailed`, since no single placement describes it.
#[derive(Debug, Default)]
pub struct RegionMap {
    /// Region start address -> (region end address, placement).
    regions: RwLock<BTreeMap<usize, (usize, MemoryInfo)>>,
}

impl RegionMap {
    pub fn new() -> RegionMap {
        Default::default()
    }

    /// Registers the region `[address, address + length)` with the given placement.
    ///
    /// Fails if the region is empty or overlaps an already registered one.
    pub fn register(&self, address: *const u8, length: usize, info: MemoryInfo) -> Result<()> {
        verify_arg!(length, length != 0);
        let range = to_range(address, length)?;

        let mut regions = self.regions.write().unwrap();
        if let Some(existing) = overlapping(&regions, &range) {
            return Err(Error::invalid_arg(
                "address",
                format!(
                    "region {:#x}..{:#x} overlaps registered region {:#x}..{:#x}",
                    range.start, range.end, existing.start, existing.end
                ),
            ));
        }
        regions.insert(range.start, (range.end, info));
        Ok(())
    }

    /// Removes the region that starts at `address`, returning its placement.
    pub fn unregister(&self, address: *const u8) -> Option<MemoryInfo> {
        self.regions
            .write()
            .unwrap()
            .remove(&(address as usize))
            .map(|(_, info)| info)
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemoryDetect for RegionMap {
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo> {
        let probe = to_range(address, length)?;
        let regions = self.regions.read().unwrap();

        if let Some((&start, &(end, info))) = regions.range(..=probe.start).next_back() {
            if probe.start < end {
                if probe.end <= end {
                    return Ok(info);
                }
                return Err(Error::detection_failed(
                    probe.start,
                    length,
                    format!("probe extends past the end of region {start:#x}..{end:#x}"),
                ));
            }
        }

        if let Some(start) = regions.range(probe.start..probe.end).map(|(&s, _)| s).next() {
            return Err(Error::detection_failed(
                probe.start,
                length,
                format!("probe straddles the start of region at {start:#x}"),
            ));
        }

        Ok(MemoryInfo::host())
    }
}

fn to_range(address: *const u8, length: usize) -> Result<Range<usize>> {
    let start = address as usize;
    let end = start
        .checked_add(length)
        .ok_or_else(|| Error::invalid_arg("length", "region wraps the address space"))?;
    Ok(start..end)
}

fn overlapping(
    regions: &BTreeMap<usize, (usize, MemoryInfo)>,
    range: &Range<usize>,
) -> Option<Range<usize>> {
    if let Some((&start, &(end, _))) = regions.range(..=range.start).next_back() {
        if range.start < end {
            return Some(start..end);
        }
    }
    regions
        .range(range.start..range.end)
        .next()
        .map(|(&start, &(end, _))| start..end)
}

#[cfg(test)]
mod tests {
    use segio_common::error::ErrorKind;

    use super::RegionMap;
    use crate::{MemoryDetect, MemoryInfo, MemoryType, SysDevice};

    fn addr(a: usize) -> *const u8 {
        a as *const u8
    }

    #[test]
    fn test_detect_inside_and_outside() {
        let map = RegionMap::new();
        let cuda = MemoryInfo::new(MemoryType::Cuda, SysDevice(1));
        map.register(addr(0x1000), 0x100, cuda).unwrap();

        assert_eq!(map.detect(addr(0x1000), 0x100).unwrap(), cuda);
        assert_eq!(map.detect(addr(0x1080), 0x10).unwrap(), cuda);
        assert_eq!(map.detect(addr(0x1000), 0).unwrap(), cuda);
        assert_eq!(map.detect(addr(0x1100), 0x10).unwrap(), MemoryInfo::host());
        assert_eq!(map.detect(addr(0x0f00), 0x100).unwrap(), MemoryInfo::host());
    }

    #[test]
    fn test_detect_straddling() {
        let map = RegionMap::new();
        map.register(addr(0x1000), 0x100, MemoryInfo::of_type(MemoryType::Rocm))
            .unwrap();

        let err = map.detect(addr(0x10f0), 0x20).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DetectionFailed { .. }));
        let err = map.detect(addr(0x0ff0), 0x20).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DetectionFailed { .. }));
    }

    #[test]
    fn test_register_overlap_rejected() {
        let map = RegionMap::new();
        let info = MemoryInfo::of_type(MemoryType::Cuda);
        map.register(addr(0x1000), 0x100, info).unwrap();
        assert!(map.register(addr(0x10ff), 0x10, info).unwrap_err().is_invalid_arg());
        assert!(map.register(addr(0x0f80), 0x100, info).unwrap_err().is_invalid_arg());
        assert!(map.register(addr(0x2000), 0, info).unwrap_err().is_invalid_arg());
        map.register(addr(0x1100), 0x100, info).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let map = RegionMap::new();
        let info = MemoryInfo::of_type(MemoryType::ZeDevice);
        map.register(addr(0x4000), 0x40, info).unwrap();
        assert_eq!(map.unregister(addr(0x4000)), Some(info));
        assert_eq!(map.unregister(addr(0x4000)), None);
        assert!(map.is_empty());
        assert_eq!(map.detect(addr(0x4000), 0x40).unwrap(), MemoryInfo::host());
    }
}
