//! Simulated non-host memory.
//!
//! A [`SimulatedDevice`] hands out host-backed buffers that are registered in a shared
//! [`RegionMap`] under the device's memory type, so detection reports them as device
//! memory. The device also acts as the copy engine for its memory type and counts the
//! copies routed to it.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use segio_iov::Segment;
use segio_memtype::{DispatchMemcpy, Memcpy, MemoryInfo, MemoryType, RegionMap, SysDevice};

/// A set of simulated devices sharing one region registry.
pub struct TestPlatform {
    regions: Arc<RegionMap>,
    devices: Vec<Arc<SimulatedDevice>>,
}

impl TestPlatform {
    pub fn new() -> TestPlatform {
        TestPlatform {
            regions: Arc::new(RegionMap::new()),
            devices: Vec::new(),
        }
    }

    /// Adds a device of the given memory type.
    ///
    /// # Panics
    ///
    /// Panics if `memory_type` is host-accessible or `Unknown`.
    pub fn add_device(
        &mut self,
        memory_type: MemoryType,
        sys_dev: SysDevice,
    ) -> Arc<SimulatedDevice> {
        assert!(
            !memory_type.is_host_accessible() && memory_type != MemoryType::Unknown,
            "{memory_type} is not a device memory type"
        );
        let device = Arc::new(SimulatedDevice {
            info: MemoryInfo::new(memory_type, sys_dev),
            regions: self.regions.clone(),
            copies: AtomicUsize::new(0),
        });
        self.devices.push(device.clone());
        device
    }

    /// The registry of all device regions, usable as a `MemoryDetect` service.
    pub fn regions(&self) -> Arc<RegionMap> {
        self.regions.clone()
    }

    /// A dispatching `Memcpy` with every device registered as the copy engine for its
    /// memory type, resolving `Unknown` sides through the region registry.
    pub fn memcpy(&self) -> DispatchMemcpy {
        let builder = DispatchMemcpy::builder().resolver(self.regions.clone());
        self.devices
            .iter()
            .fold(builder, |builder, device| {
                builder.engine(device.info.memory_type, device.clone())
            })
            .build()
    }
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// A device whose memory is simulated with host buffers.
pub struct SimulatedDevice {
    info: MemoryInfo,
    regions: Arc<RegionMap>,
    copies: AtomicUsize,
}

impl SimulatedDevice {
    pub fn info(&self) -> MemoryInfo {
        self.info
    }

    /// Allocates a zero-filled buffer of `len` bytes in device memory.
    pub fn alloc(&self, len: usize) -> DeviceBuffer {
        self.alloc_from(&vec![0u8; len])
    }

    /// Allocates a device buffer holding a copy of `data`.
    pub fn alloc_from(&self, data: &[u8]) -> DeviceBuffer {
        let mut data = data.to_vec().into_boxed_slice();
        let registered = !data.is_empty();
        if registered {
            self.regions
                .register(data.as_mut_ptr(), data.len(), self.info)
                .expect("register device region");
        }
        DeviceBuffer {
            data,
            registered,
            regions: self.regions.clone(),
        }
    }

    /// Number of copies routed to this device's engine so far.
    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::Relaxed)
    }
}

impl Memcpy for SimulatedDevice {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        assert!(
            dst_type == self.info.memory_type || src_type == self.info.memory_type,
            "{} engine asked to copy {src_type} -> {dst_type}",
            self.info.memory_type
        );
        self.copies.fetch_add(1, Ordering::Relaxed);
        unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
    }
}

/// A buffer in simulated device memory; unregistered from the platform on drop.
pub struct DeviceBuffer {
    data: Box<[u8]>,
    registered: bool,
    regions: Arc<RegionMap>,
}

impl DeviceBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A segment covering the whole buffer.
    pub fn segment(&mut self) -> Segment {
        Segment::from_mut_slice(&mut self.data)
    }

    /// A segment covering `len` bytes at `offset`.
    pub fn sub_segment(&mut self, offset: usize, len: usize) -> Segment {
        Segment::from_mut_slice(&mut self.data[offset..offset + len])
    }

    /// Reads the buffer back, bypassing any copy engine.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        if self.registered {
            self.regions.unregister(self.data.as_ptr());
        }
    }
}
