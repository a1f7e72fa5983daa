//! Gather (segment list to contiguous) and scatter (contiguous to segment list).

use segio_memtype::{Memcpy, MemoryType};

use crate::{Cursor, Segment};

/// Copies up to `length` bytes from `segments`, starting at `cursor`, into the contiguous
/// buffer `dest`, and advances `cursor` past the copied bytes.
///
/// Byte `i` of `dest` receives the `i`-th byte of the concatenation of the segments
/// that follows the cursor. Fewer than `length` bytes are copied only when the list is
/// exhausted first; the returned count tells how many.
///
/// `memcpy` is called once per visited non-empty segment, with `dest_type` for the
/// destination and [`MemoryType::Unknown`] for the segment: segment placement is not
/// inspected here, the copy service routes it by address. Zero-length segments issue
/// no copy.
///
/// A zero `length` is a no-op and leaves the cursor untouched. Otherwise the cursor is
/// left in canonical form.
///
/// # Safety
///
/// - `dest` must be valid for writes of `length` bytes in `dest_type` memory.
/// - Every segment at or after the cursor must be valid for reads of its full length.
/// - `dest` must not overlap any of those segments.
pub unsafe fn gather<M: Memcpy + ?Sized>(
    memcpy: &M,
    dest: *mut u8,
    segments: &[Segment],
    length: usize,
    cursor: &mut Cursor,
    dest_type: MemoryType,
) -> usize {
    if length == 0 {
        return 0;
    }

    let copied = walk(segments, length, cursor, |segment_ptr, pos, len| unsafe {
        memcpy.memcpy(
            dest.wrapping_add(pos),
            dest_type,
            segment_ptr,
            MemoryType::Unknown,
            len,
        );
    });
    log::trace!(
        "gather: {copied}/{length} bytes into {dest_type} buffer, cursor now ({}, {})",
        cursor.segment,
        cursor.offset
    );
    copied
}

/// Copies up to `length` bytes from the contiguous buffer `src` into `segments`,
/// starting at `cursor`, and advances `cursor` past the written bytes.
///
/// Returns the number of bytes written, which is less than `length` only when the list
/// is exhausted first. Callers commonly branch on `copied < length` to learn whether
/// the data fit.
///
/// `memcpy` is called once per visited non-empty segment, with [`MemoryType::Unknown`]
/// for the segment and `src_type` for the source. Zero-length segments issue no copy.
///
/// A zero `length` is a no-op and leaves the cursor untouched. Otherwise the cursor is
/// left in canonical form.
///
/// # Safety
///
/// - `src` must be valid for reads of `length` bytes in `src_type` memory.
/// - Every segment at or after the cursor must be valid for writes of its full length.
/// - `src` must not overlap any of those segments; overlap is not detected.
pub unsafe fn scatter<M: Memcpy + ?Sized>(
    memcpy: &M,
    segments: &[Segment],
    src: *const u8,
    length: usize,
    cursor: &mut Cursor,
    src_type: MemoryType,
) -> usize {
    if length == 0 {
        return 0;
    }

    let copied = walk(segments, length, cursor, |segment_ptr, pos, len| unsafe {
        memcpy.memcpy(
            segment_ptr,
            MemoryType::Unknown,
            src.wrapping_add(pos),
            src_type,
            len,
        );
    });
    log::trace!(
        "scatter: {copied}/{length} bytes from {src_type} buffer, cursor now ({}, {})",
        cursor.segment,
        cursor.offset
    );
    copied
}

/// Visits at most `length` bytes of `segments` from `cursor`, calling
/// `f(segment_ptr, contiguous_pos, len)` for every non-empty run, and stores the
/// canonical cursor past the last visited byte.
///
/// Returns the number of bytes visited.
fn walk<F>(segments: &[Segment], length: usize, cursor: &mut Cursor, mut f: F) -> usize
where
    F: FnMut(*mut u8, usize, usize),
{
    let Cursor {
        mut segment,
        mut offset,
    } = cursor.normalized(segments);
    let mut done = 0;
    while done < length {
        let Some(seg) = segments.get(segment) else {
            break;
        };
        let len = (seg.length - offset).min(length - done);
        if len != 0 {
            f(seg.ptr_at(offset), done, len);
        }
        done += len;
        offset += len;
        if offset == seg.length {
            segment += 1;
            offset = 0;
        }
    }
    *cursor = Cursor::new(segment, offset).normalized(segments);
    done
}

#[cfg(test)]
mod tests {
    use segio_memtype::{HostMemcpy, MemoryType};

    use super::{gather, scatter};
    use crate::{Cursor, Segment};

    struct Buffers {
        storage: Vec<Vec<u8>>,
    }

    impl Buffers {
        fn new(lengths: &[usize]) -> Buffers {
            Buffers {
                storage: lengths.iter().map(|&len| vec![0u8; len]).collect(),
            }
        }

        fn segments(&mut self) -> Vec<Segment> {
            self.storage
                .iter_mut()
                .map(|buf| Segment::from_mut_slice(buf))
                .collect()
        }
    }

    #[test]
    fn test_scatter_full() {
        let mut bufs = Buffers::new(&[4, 0, 3]);
        let segs = bufs.segments();
        let mut c = Cursor::START;
        let copied = unsafe {
            scatter(
                &HostMemcpy,
                &segs,
                b"ABCDEFG".as_ptr(),
                7,
                &mut c,
                MemoryType::Host,
            )
        };
        assert_eq!(copied, 7);
        assert!(c.is_terminal(&segs));
        assert_eq!(bufs.storage[0], b"ABCD");
        assert!(bufs.storage[1].is_empty());
        assert_eq!(bufs.storage[2], b"EFG");
    }

    #[test]
    fn test_scatter_partial() {
        let mut bufs = Buffers::new(&[4, 0, 3]);
        let segs = bufs.segments();
        let mut c = Cursor::START;
        let copied = unsafe {
            scatter(
                &HostMemcpy,
                &segs,
                b"ABCDE".as_ptr(),
                5,
                &mut c,
                MemoryType::Host,
            )
        };
        assert_eq!(copied, 5);
        assert_eq!(c, Cursor::new(2, 1));
        assert_eq!(bufs.storage[0], b"ABCD");
        assert_eq!(bufs.storage[2], b"E\0\0");
    }

    #[test]
    fn test_gather_resume() {
        let data = [b"hello".to_vec(), Vec::new(), b", ".to_vec(), b"world".to_vec()];
        let segs = data
            .iter()
            .map(|buf| Segment::from_slice(buf))
            .collect::<Vec<_>>();

        let mut out = [0u8; 12];
        let mut c = Cursor::START;
        let mut pos = 0;
        for step in [3, 4, 1, 10] {
            let n = unsafe {
                gather(
                    &HostMemcpy,
                    out[pos..].as_mut_ptr(),
                    &segs,
                    step.min(out.len() - pos),
                    &mut c,
                    MemoryType::Host,
                )
            };
            pos += n;
        }
        assert_eq!(pos, 12);
        assert_eq!(&out, b"hello, world");
        assert!(c.is_terminal(&segs));
    }

    #[test]
    fn test_zero_length_and_terminal_noop() {
        let mut bufs = Buffers::new(&[2, 2]);
        let segs = bufs.segments();
        let mut out = [0u8; 4];

        let mut c = Cursor::new(0, 2);
        let n = unsafe {
            gather(
                &HostMemcpy,
                out.as_mut_ptr(),
                &segs,
                0,
                &mut c,
                MemoryType::Host,
            )
        };
        assert_eq!(n, 0);
        assert_eq!(c, Cursor::new(0, 2));

        let mut c = Cursor::terminal(&segs);
        let n = unsafe {
            gather(
                &HostMemcpy,
                out.as_mut_ptr(),
                &segs,
                4,
                &mut c,
                MemoryType::Host,
            )
        };
        assert_eq!(n, 0);
        assert!(c.is_terminal(&segs));

        let mut c = Cursor::START;
        let n = unsafe {
            gather(
                &HostMemcpy,
                out.as_mut_ptr(),
                &[],
                4,
                &mut c,
                MemoryType::Host,
            )
        };
        assert_eq!(n, 0);
    }
}
