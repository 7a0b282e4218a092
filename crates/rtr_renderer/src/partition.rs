//! Static pixel partitioning for parallel rendering.
//!
//! The flat row-major pixel index space is cut into one contiguous range
//! per worker. Every range but the last has the same size; the last also
//! takes the remainder.

use crate::RenderError;

/// A contiguous run of row-major pixel indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    /// First pixel index
    pub start: usize,
    /// Number of pixels
    pub len: usize,
    /// Index of the worker responsible for this range
    pub worker: usize,
}

impl PixelRange {
    pub fn new(start: usize, len: usize, worker: usize) -> Self {
        Self { start, len, worker }
    }

    /// One past the last pixel index.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pixel indices covered by this range.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    /// `(column, row)` of every pixel in the range, for an image `width` wide.
    pub fn pixels(&self, width: u32) -> impl Iterator<Item = (u32, u32)> {
        let width = width.max(1) as usize;
        self.indices()
            .map(move |p| ((p % width) as u32, (p / width) as u32))
    }
}

/// Split `total` pixels across `workers`.
///
/// Worker `i` gets `[i * chunk, i * chunk + len_i)` with `chunk = total / workers`;
/// the last worker's length also includes `total % workers`. With more
/// workers than pixels the leading ranges are empty.
pub fn partition(total: usize, workers: usize) -> Result<Vec<PixelRange>, RenderError> {
    if workers == 0 {
        return Err(RenderError::ZeroWorkers);
    }

    let chunk = total / workers;
    let remainder = total % workers;

    let ranges = (0..workers)
        .map(|worker| {
            let len = if worker + 1 == workers { chunk + remainder } else { chunk };
            PixelRange::new(worker * chunk, len, worker)
        })
        .collect();

    Ok(ranges)
}
