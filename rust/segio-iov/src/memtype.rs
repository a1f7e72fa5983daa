//! Memory placement inspection of a segment list.

use segio_common::{
    Result,
    error::{Error, ErrorKind},
};
use segio_memtype::{MemoryDetect, MemoryInfo, MemoryType, SysDevice};

use crate::Segment;

/// Per-request parameters that affect placement inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Memory type the caller asserts for every segment of the list.
    ///
    /// When set, [`memtype_detect`] trusts it without consulting the detection
    /// service, even if it disagrees with the actual placement.
    pub memory_type: Option<MemoryType>,
}

impl RequestParams {
    pub fn new() -> RequestParams {
        Default::default()
    }

    pub fn with_memory_type(mut self, memory_type: MemoryType) -> RequestParams {
        self.memory_type = Some(memory_type);
        self
    }
}

/// Summary placement of a segment list, as produced by [`memtype_detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IovMemoryInfo {
    /// Common placement of all non-empty segments. `memory_type` is
    /// [`MemoryType::Unknown`] when the segments disagree, and `sys_dev` is
    /// [`SysDevice::UNKNOWN`] when their devices disagree.
    pub info: MemoryInfo,
    /// Number of non-empty segments.
    pub sg_count: usize,
}

/// Verifies that every non-empty segment lives in `expected.memory_type` memory.
///
/// Stops at the first mismatching segment with an `InvalidArgument` error. A hard
/// detection failure is also reported as `InvalidArgument`; other detection errors are
/// returned unchanged.
pub fn memtype_check<D: MemoryDetect + ?Sized>(
    ctx: &D,
    segments: &[Segment],
    expected: &MemoryInfo,
) -> Result<()> {
    for (index, segment) in nonempty(segments) {
        let info = detect_segment(ctx, index, segment)?;
        if info.memory_type != expected.memory_type {
            log::debug!(
                "memtype_check: segment {index} is {} memory, expected {}",
                info.memory_type,
                expected.memory_type
            );
            return Err(Error::invalid_arg(
                "segments",
                format!(
                    "segment {index} is {} memory, expected {}",
                    info.memory_type, expected.memory_type
                ),
            ));
        }
    }
    Ok(())
}

/// Derives the summary placement of the segment list.
///
/// The first non-empty segment sets the candidate placement; any later segment of a
/// different memory type turns the result into [`MemoryType::Unknown`], and any later
/// segment on a different device turns the device into [`SysDevice::UNKNOWN`]. An empty
/// or all-empty list is reported as host memory with `sg_count == 0`.
///
/// If `params` carries a memory type hint, the detection service is not consulted at
/// all and the hint is trusted for every segment.
///
/// A hard detection failure is reported as `InvalidArgument`; other detection errors
/// are returned unchanged.
pub fn memtype_detect<D: MemoryDetect + ?Sized>(
    ctx: &D,
    segments: &[Segment],
    params: &RequestParams,
) -> Result<IovMemoryInfo> {
    let mut result = MemoryInfo::host();
    let mut sg_count = 0usize;
    for (index, segment) in nonempty(segments) {
        let info = match params.memory_type {
            Some(memory_type) => MemoryInfo::of_type(memory_type),
            None => detect_segment(ctx, index, segment)?,
        };

        sg_count += 1;
        if sg_count == 1 {
            result = info;
            continue;
        }

        if info.memory_type != result.memory_type && result.memory_type != MemoryType::Unknown {
            log::debug!(
                "memtype_detect: segment {index} is {} memory, list so far is {}; \
                 reporting heterogeneous placement",
                info.memory_type,
                result.memory_type
            );
            result.memory_type = MemoryType::Unknown;
        }
        if info.sys_dev != result.sys_dev {
            result.sys_dev = SysDevice::UNKNOWN;
        }
    }

    Ok(IovMemoryInfo {
        info: result,
        sg_count,
    })
}

fn nonempty(segments: &[Segment]) -> impl Iterator<Item = (usize, &Segment)> {
    segments.iter().enumerate().filter(|(_, seg)| !seg.is_empty())
}

fn detect_segment<D: MemoryDetect + ?Sized>(
    ctx: &D,
    index: usize,
    segment: &Segment,
) -> Result<MemoryInfo> {
    ctx.detect(segment.address, segment.length).map_err(|e| {
        if matches!(e.kind(), ErrorKind::DetectionFailed { .. }) {
            Error::invalid_arg("segments", format!("segment {index}: {e}"))
        } else {
            e
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use segio_common::{Result, error::ErrorKind};
    use segio_memtype::{HostOnlyDetect, MemoryDetect, MemoryInfo, MemoryType, SysDevice};

    use super::{RequestParams, memtype_check, memtype_detect};
    use crate::Segment;

    /// Classifies a segment by its address: `0x1000 * n` -> `TYPES[n]`, device `n`.
    struct ByAddress {
        probes: AtomicUsize,
    }

    const TYPES: [MemoryType; 4] = [
        MemoryType::Host,
        MemoryType::Host,
        MemoryType::Cuda,
        MemoryType::Rocm,
    ];

    impl ByAddress {
        fn new() -> ByAddress {
            ByAddress {
                probes: AtomicUsize::new(0),
            }
        }
    }

    impl MemoryDetect for ByAddress {
        fn detect(&self, address: *const u8, _length: usize) -> Result<MemoryInfo> {
            self.probes.fetch_add(1, Ordering::Relaxed);
            let n = address as usize / 0x1000;
            Ok(MemoryInfo::new(TYPES[n], SysDevice(n as u8)))
        }
    }

    fn seg(slot: usize, len: usize) -> Segment {
        Segment::new((slot * 0x1000) as *mut u8, len)
    }

    #[test]
    fn test_detect_empty_list() {
        let r = memtype_detect(&HostOnlyDetect, &[], &RequestParams::new()).unwrap();
        assert_eq!(r.sg_count, 0);
        assert_eq!(r.info, MemoryInfo::host());

        let ctx = ByAddress::new();
        let r = memtype_detect(&ctx, &[seg(2, 0), seg(3, 0)], &RequestParams::new()).unwrap();
        assert_eq!(r.sg_count, 0);
        assert_eq!(r.info, MemoryInfo::host());
        assert_eq!(ctx.probes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_detect_sys_dev_merge() {
        let ctx = ByAddress::new();
        let r = memtype_detect(&ctx, &[seg(2, 8), seg(2, 8)], &RequestParams::new()).unwrap();
        assert_eq!(r.info, MemoryInfo::new(MemoryType::Cuda, SysDevice(2)));
        assert_eq!(r.sg_count, 2);

        // Same type, different devices.
        let r = memtype_detect(&ctx, &[seg(0, 8), seg(1, 8)], &RequestParams::new()).unwrap();
        assert_eq!(r.info, MemoryInfo::new(MemoryType::Host, SysDevice::UNKNOWN));
    }

    #[test]
    fn test_detect_stays_unknown() {
        let ctx = ByAddress::new();
        let segs = [seg(2, 8), seg(3, 8), seg(2, 8)];
        let r = memtype_detect(&ctx, &segs, &RequestParams::new()).unwrap();
        assert_eq!(r.info.memory_type, MemoryType::Unknown);
        assert_eq!(r.sg_count, 3);
    }

    #[test]
    fn test_detect_hint_bypasses_service() {
        let ctx = ByAddress::new();
        let segs = [seg(0, 8), Segment::EMPTY, seg(2, 8)];
        let params = RequestParams::new().with_memory_type(MemoryType::ZeDevice);
        let r = memtype_detect(&ctx, &segs, &params).unwrap();
        assert_eq!(r.info, MemoryInfo::of_type(MemoryType::ZeDevice));
        assert_eq!(r.sg_count, 2);
        assert_eq!(ctx.probes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_check_skips_empty_segments() {
        let ctx = ByAddress::new();
        // The empty segment sits at a CUDA address but holds no bytes.
        let segs = [seg(0, 8), seg(2, 0), seg(1, 8)];
        memtype_check(&ctx, &segs, &MemoryInfo::host()).unwrap();
        assert_eq!(ctx.probes.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_check_short_circuits() {
        let ctx = ByAddress::new();
        let segs = [seg(0, 8), seg(3, 8), seg(2, 8)];
        let err = memtype_check(&ctx, &segs, &MemoryInfo::host()).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { message, .. } => {
                assert_eq!(message, "segment 1 is rocm memory, expected host")
            }
            kind => panic!("unexpected kind {kind:?}"),
        }
        assert_eq!(ctx.probes.load(Ordering::Relaxed), 2);
    }
}
