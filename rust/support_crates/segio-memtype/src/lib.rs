//! Memory placement descriptors and the services that act on them.
//!
//! This crate provides the vocabulary shared by everything that moves bytes
//! between memory domains (host RAM, GPU device memory, managed memory):
//!
//! - [`memory_type`]: [`MemoryType`], [`SysDevice`] and [`MemoryInfo`] descriptors.
//! - [`memcpy`]: the [`Memcpy`] copy service, parametrized by source and destination
//!   memory types, with a host-only and a dispatching implementation.
//! - [`detect`]: the [`MemoryDetect`] service mapping an address range to its
//!   [`MemoryInfo`].
//! - [`region_map`]: [`RegionMap`], a registry of known memory regions that implements
//!   [`MemoryDetect`].

pub mod detect;
pub mod memcpy;
pub mod memory_type;
pub mod region_map;

pub use detect::{HostOnlyDetect, MemoryDetect};
pub use memcpy::{DispatchMemcpy, DispatchMemcpyBuilder, HostMemcpy, Memcpy};
pub use memory_type::{MemoryInfo, MemoryType, SysDevice};
pub use region_map::RegionMap;
