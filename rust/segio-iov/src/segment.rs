//! `Segment`: one contiguous run of bytes in a segment list.

/// A contiguous run of `length` bytes starting at `address`.
///
/// The layout matches a POSIX `iovec`. The address is opaque: it may point into host
/// memory, device memory or managed memory, and this crate never dereferences it.
/// Bytes are only moved through a [`Memcpy`](segio_memtype::Memcpy) service.
///
/// A segment list is a plain `&[Segment]`; zero-length segments are allowed anywhere
/// in it and are skipped by all movement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Segment {
    pub address: *mut u8,
    pub length: usize,
}

impl Segment {
    /// A null, zero-length segment.
    pub const EMPTY: Segment = Segment {
        address: std::ptr::null_mut(),
        length: 0,
    };

    pub fn new(address: *mut u8, length: usize) -> Segment {
        Segment { address, length }
    }

    /// A segment covering a mutable host buffer.
    pub fn from_mut_slice(buf: &mut [u8]) -> Segment {
        Segment::new(buf.as_mut_ptr(), buf.len())
    }

    /// A segment covering a read-only host buffer.
    ///
    /// Such a segment may be the source of a gather, but must never be the target
    /// of a scatter.
    pub fn from_slice(buf: &[u8]) -> Segment {
        Segment::new(buf.as_ptr() as *mut u8, buf.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Address of the byte at `offset` within the segment.
    ///
    /// The result is computed with wrapping arithmetic and is only meaningful for
    /// `offset <= length`.
    #[inline]
    pub fn ptr_at(&self, offset: usize) -> *mut u8 {
        self.address.wrapping_add(offset)
    }
}

impl Default for Segment {
    fn default() -> Self {
        Segment::EMPTY
    }
}
