//! Strided Pixel Sampling
//!
//! Metric passes never touch every pixel; they walk a coarse grid whose
//! stride is chosen per metric. The grid is a plain value, so a pass can be
//! restarted by iterating again.

/// Lazy grid of sample coordinates over a `width` x `height` image.
///
/// Yields `(x, y)` with `x = 0, stride, 2*stride, ...` and likewise for `y`,
/// bounded by the image dimensions. The origin is always the first sample of
/// a non-empty image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl SampleGrid {
    pub fn new(width: u32, height: u32, stride: u32) -> Self {
        Self {
            width,
            height,
            stride: stride.max(1),
        }
    }

    /// Iterate the grid row-major. Calling this again restarts from the
    /// origin; the grid itself is never consumed.
    pub fn coords(&self) -> impl Iterator<Item = (u32, u32)> {
        let (width, stride) = (self.width, self.stride);
        (0..self.height)
            .step_by(stride as usize)
            .flat_map(move |y| (0..width).step_by(stride as usize).map(move |x| (x, y)))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of samples the grid yields.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let cols = (self.width - 1) / self.stride + 1;
        let rows = (self.height - 1) / self.stride + 1;
        (cols as usize) * (rows as usize)
    }
}
