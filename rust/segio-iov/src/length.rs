//! Length accounting over a segment list.

use crate::Segment;

/// Total number of bytes in the segment list.
///
/// Overflow is not checked: callers are responsible for keeping aggregate sizes within
/// `usize`.
pub fn total_length(segments: &[Segment]) -> usize {
    segments
        .iter()
        .fold(0usize, |total, seg| total.wrapping_add(seg.length))
}

/// Number of segments that hold at least one byte.
///
/// This is the scatter-gather width a transport has to support to move the list
/// without staging it.
pub fn count_nonempty(segments: &[Segment]) -> usize {
    segments.iter().filter(|seg| !seg.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::{count_nonempty, total_length};
    use crate::Segment;

    #[test]
    fn test_lengths() {
        let segs = [
            Segment::new(std::ptr::null_mut(), 4),
            Segment::EMPTY,
            Segment::new(std::ptr::null_mut(), 3),
        ];
        assert_eq!(total_length(&segs), 7);
        assert_eq!(count_nonempty(&segs), 2);

        assert_eq!(total_length(&[]), 0);
        assert_eq!(count_nonempty(&[]), 0);
        assert_eq!(count_nonempty(&[Segment::EMPTY, Segment::EMPTY]), 0);
    }
}
