//! Test utilities and helpers for the segio crates.
//!
//! This crate provides:
//! - Simulated device memory: host-backed buffers registered as a non-host memory type,
//!   together with a copy engine and a dispatching `Memcpy` wired to them
//! - A call-recording `Memcpy` wrapper
//! - Detection services that fail on demand
//! - Random segment layouts and their backing storage
//!
//! # Usage
//!
//! This crate is intended for use within the segio test suites only.

pub mod data_gen;
pub mod device;
pub mod faults;
pub mod recording;

pub use data_gen::SegmentStorage;
pub use device::{DeviceBuffer, SimulatedDevice, TestPlatform};
pub use faults::{FailingDetect, Failure};
pub use recording::{MemcpyCall, RecordingMemcpy};
