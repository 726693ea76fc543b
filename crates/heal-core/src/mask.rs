//! Fill masks.
//!
//! A [`Mask`] is what the brush paints into: one 8-bit intensity per pixel,
//! 0 meaning "keep" and anything above the active [`MaskThreshold`] meaning
//! "replace". Hard brush stamps write 255, feathered stamps write intermediate
//! values, which is why the threshold is a parameter rather than a constant.
//!
//! A [`Coverage`] is the binarized, owned working copy a filler consumes. It
//! only ever transitions pixels from masked to unmasked, so the caller's
//! [`Mask`] is never aliased or modified by a fill.

use crate::error::{Error, Result};
use crate::image::RgbaImage;

/// The eight neighbour offsets in reading order.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Intensity above which a mask pixel counts as masked.
///
/// # Example
///
/// ```rust
/// use heal_core::MaskThreshold;
///
/// assert!(MaskThreshold::HARD.is_masked(200));
/// assert!(!MaskThreshold::HARD.is_masked(128));
/// assert!(MaskThreshold::SOFT.is_masked(11));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskThreshold(pub u8);

impl MaskThreshold {
    /// Threshold for hard circular brush stamps.
    pub const HARD: Self = Self(128);
    /// Threshold for feathered or antialiased masks.
    pub const SOFT: Self = Self(10);

    /// Returns `true` if `intensity` is strictly above the threshold.
    #[inline]
    pub fn is_masked(self, intensity: u8) -> bool {
        intensity > self.0
    }
}

impl Default for MaskThreshold {
    fn default() -> Self {
        Self::HARD
    }
}

/// Per-pixel 8-bit fill mask.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Creates an all-zero (nothing masked) mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Creates a mask the same size as `image`.
    pub fn for_image(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Creates a mask from raw intensities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} mask bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self { data, width, height })
    }

    /// Builds a mask from a predicate, writing 255 where it holds.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    mask.set_value(x, y, 255);
                }
            }
        }
        mask
    }

    /// Returns the mask width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the mask height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the mask dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw intensities, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw intensities.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "mask ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Intensity at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y)]
    }

    /// Intensity at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_value(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.value(x, y))
    }

    /// Sets the intensity at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_value(&mut self, x: u32, y: u32, value: u8) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Returns `true` if the pixel at (x, y) is above `threshold`.
    #[inline]
    pub fn is_masked(&self, x: u32, y: u32, threshold: MaskThreshold) -> bool {
        threshold.is_masked(self.value(x, y))
    }

    /// Resets every pixel to 0.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of masked pixels under `threshold`.
    pub fn count_masked(&self, threshold: MaskThreshold) -> usize {
        self.data.iter().filter(|&&v| threshold.is_masked(v)).count()
    }

    /// Returns `true` if no pixel is masked under `threshold`.
    pub fn is_clear(&self, threshold: MaskThreshold) -> bool {
        !self.data.iter().any(|&v| threshold.is_masked(v))
    }

    /// Binarizes the mask into an owned working [`Coverage`].
    pub fn coverage(&self, threshold: MaskThreshold) -> Coverage {
        Coverage {
            cells: self.data.iter().map(|&v| threshold.is_masked(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// `isMasked(mask, x, y)` with an explicit threshold.
#[inline]
pub fn is_masked(mask: &Mask, x: u32, y: u32, threshold: MaskThreshold) -> bool {
    mask.is_masked(x, y, threshold)
}

/// Checks that `image` and `mask` have identical dimensions.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] otherwise.
pub fn ensure_same_size(image: &RgbaImage, mask: &Mask) -> Result<()> {
    if image.dimensions() != mask.dimensions() {
        return Err(Error::dimension_mismatch(image.dimensions(), mask.dimensions()));
    }
    Ok(())
}

/// Binary working mask owned by a single fill call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    cells: Vec<bool>,
    width: u32,
    height: u32,
}

impl Coverage {
    /// Returns the coverage width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the coverage height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat row-major cells; `true` means masked.
    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Returns `true` if (x, y) is masked.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "coverage ({x}, {y}) out of bounds");
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Signed-coordinate lookup: `None` outside the image.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<bool> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Marks (x, y) resolved. Returns `true` if it was masked before.
    #[inline]
    pub fn unmask(&mut self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "coverage ({x}, {y}) out of bounds");
        let cell = &mut self.cells[y as usize * self.width as usize + x as usize];
        std::mem::replace(cell, false)
    }

    /// Number of masked pixels.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Returns `true` if nothing is masked.
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Masked coordinates in row-major order.
    pub fn iter_masked(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(move |(i, _)| (i as u32 % w, i as u32 / w))
    }

    /// Returns `true` if any in-bounds 8-neighbour of (x, y) is unmasked.
    pub fn has_unmasked_neighbor(&self, x: u32, y: u32) -> bool {
        NEIGHBORS_8
            .iter()
            .any(|&(dx, dy)| self.get(x as i64 + dx as i64, y as i64 + dy as i64) == Some(false))
    }

    /// Masked pixels with at least one unmasked 8-neighbour, row-major.
    pub fn boundary(&self) -> Vec<(u32, u32)> {
        self.iter_masked()
            .filter(|&(x, y)| self.has_unmasked_neighbor(x, y))
            .collect()
    }
}
