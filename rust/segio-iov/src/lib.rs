//! I/O-vector data movement.
//!
//! Bridges application data held in a discontiguous list of memory segments
//! (an IOV) and the contiguous staging buffers used by transports:
//!
//! - [`total_length`], [`count_nonempty`]: length accounting.
//! - [`seek`]: saturating movement of a [`Cursor`] by a signed byte distance.
//! - [`gather`]: copy from the segment list into a contiguous buffer.
//! - [`scatter`]: copy from a contiguous buffer into the segment list.
//! - [`memtype_check`], [`memtype_detect`]: memory placement inspection.
//!
//! All operations are synchronous and allocation-free. Segment memory is never
//! touched directly; bytes move through an injected [`Memcpy`] service and placement
//! is obtained from an injected [`MemoryDetect`] service, so segments may live in
//! host, device or managed memory.

pub mod copy;
pub mod cursor;
pub mod length;
pub mod memtype;
pub mod seek;
pub mod segment;

pub use copy::{gather, scatter};
pub use cursor::Cursor;
pub use length::{count_nonempty, total_length};
pub use memtype::{IovMemoryInfo, RequestParams, memtype_check, memtype_detect};
pub use seek::seek;
pub use segment::Segment;

pub use segio_memtype::{Memcpy, MemoryDetect, MemoryInfo, MemoryType, SysDevice};
