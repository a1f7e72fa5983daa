//! Memory type and placement descriptors.

use std::{fmt, str::FromStr};

use segio_common::error::Error;

/// The kind of memory a region lives in.
///
/// `Unknown` doubles as the "heterogeneous" sentinel: a multi-region buffer whose
/// regions disagree on their memory type is reported as `Unknown`, which downstream
/// transport selection treats as requiring the most conservative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MemoryType {
    /// Default system memory.
    #[default]
    Host = 0,
    /// NVIDIA CUDA device memory.
    Cuda,
    /// NVIDIA CUDA managed (unified) memory.
    CudaManaged,
    /// AMD ROCm device memory.
    Rocm,
    /// AMD ROCm managed system memory.
    RocmManaged,
    /// RDMA device memory.
    Rdma,
    /// oneAPI Level Zero host memory.
    ZeHost,
    /// oneAPI Level Zero device memory.
    ZeDevice,
    /// oneAPI Level Zero shared memory.
    ZeManaged,
    /// Memory type could not be determined, or a mix of types.
    Unknown,
}

impl MemoryType {
    /// Number of distinct memory types, including `Unknown`.
    pub const COUNT: usize = 10;

    /// All memory types, in discriminant order.
    pub const ALL: [MemoryType; Self::COUNT] = [
        MemoryType::Host,
        MemoryType::Cuda,
        MemoryType::CudaManaged,
        MemoryType::Rocm,
        MemoryType::RocmManaged,
        MemoryType::Rdma,
        MemoryType::ZeHost,
        MemoryType::ZeDevice,
        MemoryType::ZeManaged,
        MemoryType::Unknown,
    ];

    /// Stable lowercase name of the memory type.
    pub fn name(self) -> &'static str {
        match self {
            MemoryType::Host => "host",
            MemoryType::Cuda => "cuda",
            MemoryType::CudaManaged => "cuda-managed",
            MemoryType::Rocm => "rocm",
            MemoryType::RocmManaged => "rocm-managed",
            MemoryType::Rdma => "rdma",
            MemoryType::ZeHost => "ze-host",
            MemoryType::ZeDevice => "ze-device",
            MemoryType::ZeManaged => "ze-managed",
            MemoryType::Unknown => "unknown",
        }
    }

    /// Index of the memory type in [`MemoryType::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` if the CPU can load and store this memory directly.
    ///
    /// Host memory and the managed/host-mapped kinds qualify; device-only memory
    /// (and `Unknown`) does not.
    #[inline]
    pub fn is_host_accessible(self) -> bool {
        matches!(
            self,
            MemoryType::Host
                | MemoryType::CudaManaged
                | MemoryType::RocmManaged
                | MemoryType::ZeHost
                | MemoryType::ZeManaged
        )
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_arg("memory type", format!("unrecognized name '{s}'")))
    }
}

/// Identifier of the system device (GPU, NIC) that owns a memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SysDevice(pub u8);

impl SysDevice {
    pub const UNKNOWN: SysDevice = SysDevice(u8::MAX);

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl Default for SysDevice {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Placement of a memory region: its memory type and owning system device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryInfo {
    pub memory_type: MemoryType,
    pub sys_dev: SysDevice,
}

impl MemoryInfo {
    pub fn new(memory_type: MemoryType, sys_dev: SysDevice) -> MemoryInfo {
        MemoryInfo {
            memory_type,
            sys_dev,
        }
    }

    /// Host memory on no particular device.
    pub fn host() -> MemoryInfo {
        MemoryInfo::new(MemoryType::Host, SysDevice::UNKNOWN)
    }

    /// Placement of a region whose memory type is known but whose device is not.
    pub fn of_type(memory_type: MemoryType) -> MemoryInfo {
        MemoryInfo::new(memory_type, SysDevice::UNKNOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryInfo, MemoryType, SysDevice};

    #[test]
    fn test_names_roundtrip() {
        for t in MemoryType::ALL {
            assert_eq!(t.to_string().parse::<MemoryType>().unwrap(), t);
        }
        assert_eq!("CUDA".parse::<MemoryType>().unwrap(), MemoryType::Cuda);
        assert!("gpu".parse::<MemoryType>().unwrap_err().is_invalid_arg());
    }

    #[test]
    fn test_index_matches_all() {
        for (i, t) in MemoryType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_host_accessible() {
        assert!(MemoryType::Host.is_host_accessible());
        assert!(MemoryType::CudaManaged.is_host_accessible());
        assert!(!MemoryType::Cuda.is_host_accessible());
        assert!(!MemoryType::Rdma.is_host_accessible());
        assert!(!MemoryType::Unknown.is_host_accessible());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(MemoryInfo::default(), MemoryInfo::host());
        assert!(MemoryInfo::host().sys_dev.is_unknown());
        assert!(!SysDevice(0).is_unknown());
    }
}
