//! RGBA8 pixel buffer.
//!
//! [`RgbaImage`] is the data contract between the fillers and whatever owns
//! the picture being edited: a flat, row-major array of `width * height`
//! pixels with four 8-bit channels each.
//!
//! ```text
//! index(x, y) = (y * width + x) * 4
//!
//! [R G B A][R G B A][R G B A] ... row 0
//! [R G B A][R G B A][R G B A] ... row 1
//! ```
//!
//! Dimensions are fixed for the life of the buffer. Accessors taking raw
//! coordinates treat an out-of-range coordinate as a caller bug and panic;
//! use [`RgbaImage::get_pixel`] or [`RgbaImage::try_pixel`] when the
//! coordinate is not already known to be valid.

use crate::error::{Error, Result};

/// One pixel as `[R, G, B, A]`.
pub type Rgba8 = [u8; 4];

/// Fully opaque alpha value.
pub const OPAQUE: u8 = 255;

/// Channels per pixel.
pub const CHANNELS: usize = 4;

/// Row-major RGBA8 image buffer.
///
/// # Example
///
/// ```rust
/// use heal_core::RgbaImage;
///
/// let mut img = RgbaImage::filled(4, 3, [255, 0, 0, 255]);
/// img.set_pixel(1, 2, [0, 0, 255, 255]);
/// assert_eq!(img.pixel(1, 2), [0, 0, 255, 255]);
/// assert_eq!(img.get_pixel(4, 0), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RgbaImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RgbaImage {
    /// Creates an image filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * CHANNELS],
            width,
            height,
        }
    }

    /// Creates an image from existing RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height * 4`.
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self { data, width, height })
    }

    /// Creates an image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Rgba8) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self { data, width, height }
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if `(x, y)` lies inside the image.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Returns the pixel at (x, y) or [`Error::OutOfBounds`].
    pub fn try_pixel(&self, x: u32, y: u32) -> Result<Rgba8> {
        self.get_pixel(x, y)
            .ok_or_else(|| Error::out_of_bounds(x, y, self.width, self.height))
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgba8) {
        let o = self.offset(x, y);
        self.data[o..o + CHANNELS].copy_from_slice(&pixel);
    }

    /// Sets the pixel at (x, y) or returns [`Error::OutOfBounds`].
    pub fn try_set_pixel(&mut self, x: u32, y: u32, pixel: Rgba8) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        self.set_pixel(x, y, pixel);
        Ok(())
    }

    /// Fills the entire image with a pixel value.
    pub fn fill(&mut self, pixel: Rgba8) {
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&pixel);
        }
    }

    /// Iterates over all pixels as `(x, y, pixel)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba8)> + '_ {
        let w = self.width.max(1);
        self.data.chunks_exact(CHANNELS).enumerate().map(move |(i, c)| {
            let i = i as u32;
            (i % w, i / w, [c[0], c[1], c[2], c[3]])
        })
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent_black() {
        let img = RgbaImage::new(3, 2);
        assert_eq!(img.data().len(), 3 * 2 * 4);
        assert!(img.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_data_rejects_bad_length() {
        let err = RgbaImage::from_data(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
        assert!(RgbaImage::from_data(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_row_major_layout() {
        let mut img = RgbaImage::new(3, 2);
        img.set_pixel(2, 1, [1, 2, 3, 4]);
        let o = (3 + 2) * 4; // row 1 of a 3-wide image, column 2
        assert_eq!(&img.data()[o..o + 4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_checked_access() {
        let mut img = RgbaImage::filled(2, 2, [9, 9, 9, 255]);
        assert_eq!(img.try_pixel(1, 1).unwrap(), [9, 9, 9, 255]);
        assert!(img.try_pixel(2, 0).unwrap_err().is_bounds_error());
        assert!(img.try_set_pixel(0, 5, [0; 4]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_pixel_out_of_bounds_panics() {
        let img = RgbaImage::new(2, 2);
        let _ = img.pixel(2, 0);
    }

    #[test]
    fn test_pixels_iterator_coordinates() {
        let img = RgbaImage::filled(3, 2, [1, 1, 1, 1]);
        let coords: Vec<_> = img.pixels().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }
}
