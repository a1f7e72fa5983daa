//! Detection services that fail on demand.

use std::sync::atomic::{AtomicUsize, Ordering};

use segio_common::{Result, error::Error};
use segio_memtype::{MemoryDetect, MemoryInfo};

/// How [`FailingDetect`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A hard probe failure (`DetectionFailed`).
    Hard,
    /// A service status (`Service` wrapping an I/O error).
    Service,
}

/// Reports host memory for the first `healthy_probes` probes, then fails every probe.
pub struct FailingDetect {
    failure: Failure,
    healthy_probes: usize,
    probes: AtomicUsize,
}

impl FailingDetect {
    pub fn new(failure: Failure) -> FailingDetect {
        FailingDetect::after(failure, 0)
    }

    pub fn after(failure: Failure, healthy_probes: usize) -> FailingDetect {
        FailingDetect {
            failure,
            healthy_probes,
            probes: AtomicUsize::new(0),
        }
    }

    /// Number of probes issued so far.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

impl MemoryDetect for FailingDetect {
    fn detect(&self, address: *const u8, length: usize) -> Result<MemoryInfo> {
        let n = self.probes.fetch_add(1, Ordering::Relaxed);
        if n < self.healthy_probes {
            return Ok(MemoryInfo::host());
        }
        Err(match self.failure {
            Failure::Hard => Error::detection_failed(address as usize, length, "probe rejected"),
            Failure::Service => Error::service(
                "memory query",
                std::io::Error::other("driver not loaded"),
            ),
        })
    }
}
