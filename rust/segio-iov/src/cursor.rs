//! `Cursor`: a position within a segment list.

use crate::{Segment, length::total_length};

/// A position within a segment list: the index of a segment and a byte offset inside it.
///
/// A cursor is only meaningful together with the list it was produced for.
///
/// The **terminal** cursor, one past the last byte, is `(segments.len(), 0)`. Several
/// raw values denote the same logical position: `(i, segments[i].length)` is the same
/// position as the first byte of the next non-empty segment, and a cursor sitting on a
/// zero-length segment is the same as the next non-empty one. Every movement operation
/// ([`seek`](crate::seek), [`gather`](crate::gather), [`scatter`](crate::scatter))
/// accepts any of these forms and leaves the cursor in **canonical** form: either
/// terminal, or `offset < segments[segment].length`.
///
/// The derived `PartialEq` compares raw fields; use [`Cursor::same_position`] to compare
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    /// Index of the current segment.
    pub segment: usize,
    /// Byte offset within the current segment.
    pub offset: usize,
}

impl Cursor {
    /// The first byte of the list.
    pub const START: Cursor = Cursor {
        segment: 0,
        offset: 0,
    };

    pub fn new(segment: usize, offset: usize) -> Cursor {
        Cursor { segment, offset }
    }

    /// The canonical terminal cursor for `segments`.
    pub fn terminal(segments: &[Segment]) -> Cursor {
        Cursor::new(segments.len(), 0)
    }

    /// Returns the canonical form of this cursor.
    ///
    /// An offset past the end of its segment is treated as the end of that segment.
    pub fn normalized(self, segments: &[Segment]) -> Cursor {
        let mut segment = self.segment;
        let mut offset = self.offset;
        while let Some(seg) = segments.get(segment) {
            if offset < seg.length {
                return Cursor::new(segment, offset);
            }
            segment += 1;
            offset = 0;
        }
        Cursor::terminal(segments)
    }

    /// Returns `true` if no bytes remain between this cursor and the end of the list.
    pub fn is_terminal(&self, segments: &[Segment]) -> bool {
        self.normalized(segments).segment == segments.len()
    }

    /// Returns `true` if both cursors denote the same position in `segments`.
    pub fn same_position(&self, segments: &[Segment], other: &Cursor) -> bool {
        self.normalized(segments) == other.normalized(segments)
    }

    /// Number of bytes between the start of the list and this cursor.
    pub fn position(&self, segments: &[Segment]) -> usize {
        let c = self.normalized(segments);
        total_length(&segments[..c.segment]) + c.offset
    }

    /// Number of bytes between this cursor and the end of the list.
    pub fn remaining(&self, segments: &[Segment]) -> usize {
        total_length(segments) - self.position(segments)
    }

    /// The canonical cursor `position` bytes from the start of the list, saturating at
    /// the terminal cursor.
    pub fn at_position(segments: &[Segment], position: usize) -> Cursor {
        let mut left = position;
        for (index, seg) in segments.iter().enumerate() {
            if left < seg.length {
                return Cursor::new(index, left);
            }
            left -= seg.length;
        }
        Cursor::terminal(segments)
    }
}
