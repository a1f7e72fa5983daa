//! Random segment layouts and the host storage behind them.

use segio_iov::Segment;

/// Generates `count` random segment lengths in `0..=max_len`, roughly a quarter of
/// them zero.
pub fn random_lengths(count: usize, max_len: usize) -> Vec<usize> {
    (0..count)
        .map(|_| {
            if max_len == 0 || fastrand::u8(0..4) == 0 {
                0
            } else {
                fastrand::usize(1..=max_len)
            }
        })
        .collect()
}

/// Generates `len` random bytes.
pub fn random_bytes(len: usize) -> Vec<u8> {
    std::iter::repeat_with(|| fastrand::u8(..)).take(len).collect()
}

/// Owns one host buffer per segment of a layout.
///
/// The segments returned by [`SegmentStorage::segments`] stay valid for as long as the
/// storage is alive and not resized.
#[derive(Debug, Clone)]
pub struct SegmentStorage {
    buffers: Vec<Vec<u8>>,
}

impl SegmentStorage {
    /// Zero-filled storage for the given segment lengths.
    pub fn zeroed(lengths: &[usize]) -> SegmentStorage {
        SegmentStorage {
            buffers: lengths.iter().map(|&len| vec![0u8; len]).collect(),
        }
    }

    /// Storage for the given segment lengths, filled with consecutive bytes of `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than the sum of `lengths`.
    pub fn filled(lengths: &[usize], data: &[u8]) -> SegmentStorage {
        let mut pos = 0;
        let buffers = lengths
            .iter()
            .map(|&len| {
                let buf = data[pos..pos + len].to_vec();
                pos += len;
                buf
            })
            .collect();
        SegmentStorage { buffers }
    }

    /// The segment list covering the storage buffers.
    pub fn segments(&mut self) -> Vec<Segment> {
        self.buffers
            .iter_mut()
            .map(|buf| Segment::from_mut_slice(buf))
            .collect()
    }

    /// Contents of the segment at `index`.
    pub fn buffer(&self, index: usize) -> &[u8] {
        &self.buffers[index]
    }

    /// Concatenated contents of all segments.
    pub fn concat(&self) -> Vec<u8> {
        self.buffers.concat()
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.buffers.iter().map(Vec::len).collect()
    }
}
