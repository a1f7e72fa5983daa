//! Signed, saturating cursor movement.

use crate::{Cursor, Segment};

/// Moves `cursor` by `distance` bytes: forward when positive, backward when negative.
///
/// Forward motion consumes the rest of the current segment and then subsequent ones;
/// backward motion consumes the bytes before the cursor in the current segment and then
/// re-enters preceding segments from their tail. Zero-length segments are crossed
/// without consuming any distance.
///
/// The movement saturates: a distance that would leave the list stops the cursor at the
/// terminal position (forward) or at the first byte (backward). Callers that need the
/// cursor to have moved by exactly `distance` must check against
/// [`Cursor::remaining`] / [`Cursor::position`] first.
///
/// The first byte is reported in canonical form: leading zero-length segments are
/// skipped, so for `[0, 0, 5]` a saturated backward seek yields `(2, 0)`, not
/// [`Cursor::START`]. Compare with [`Cursor::same_position`] or [`Cursor::position`]
/// rather than `==`. A list with no bytes at all saturates to its terminal cursor.
///
/// A zero distance leaves the cursor untouched; any other distance leaves it in
/// canonical form.
pub fn seek(segments: &[Segment], distance: isize, cursor: &mut Cursor) {
    if distance == 0 {
        return;
    }

    let from = cursor.normalized(segments);
    *cursor = if distance > 0 {
        seek_forward(segments, from, distance.unsigned_abs())
    } else {
        seek_backward(segments, from, distance.unsigned_abs())
    };
}

fn seek_forward(segments: &[Segment], from: Cursor, distance: usize) -> Cursor {
    let mut segment = from.segment;
    let mut offset = from.offset;
    let mut left = distance;
    while let Some(seg) = segments.get(segment) {
        let remainder = seg.length - offset;
        if left < remainder {
            return Cursor::new(segment, offset + left);
        }
        left -= remainder;
        segment += 1;
        offset = 0;
    }

    if left != 0 {
        log::trace!("seek: forward seek by {distance} saturated {left} bytes past the end");
    }
    Cursor::terminal(segments)
}

fn seek_backward(segments: &[Segment], from: Cursor, distance: usize) -> Cursor {
    let mut segment = from.segment;
    // Bytes of the current segment that precede the cursor.
    let mut before = from.offset;
    let mut left = distance;
    loop {
        if left <= before {
            return Cursor::new(segment, before - left);
        }
        left -= before;
        if segment == 0 {
            log::trace!(
                "seek: backward seek by {distance} saturated {left} bytes before the start"
            );
            return Cursor::START.normalized(segments);
        }
        segment -= 1;
        before = segments[segment].length;
    }
}
