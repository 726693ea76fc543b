//! Error types for heal-core operations.
//!
//! Every error here is a precondition failure: a buffer whose length does not
//! match its declared size, an image and mask of different sizes, or a pixel
//! access outside the image. A well-formed caller never sees them, so they are
//! reported immediately and never retried.
//!
//! # Usage
//!
//! ```rust
//! use heal_core::{Error, Result};
//!
//! fn check(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(3, 3, 2, 2).is_err());
//! ```
//!
//! # Used By
//!
//! - [`crate::image::RgbaImage`] - Buffer construction and checked access
//! - [`crate::mask::Mask`] - Buffer construction, size agreement with images
//! - [`crate::io`] - Raw buffer reads and writes
//! - `heal-ops` - Wrapped into `OpsError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or accessing pixel and mask buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Image and mask dimensions disagree.
    ///
    /// Both fillers require the mask to cover the image exactly.
    #[error("dimension mismatch: image {image_width}x{image_height} vs mask {mask_width}x{mask_height}")]
    DimensionMismatch {
        /// Image width
        image_width: u32,
        /// Image height
        image_height: u32,
        /// Mask width
        mask_width: u32,
        /// Mask height
        mask_height: u32,
    },

    /// Buffer length does not match the declared dimensions.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// I/O error while reading or writing a raw buffer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error from `(width, height)` pairs.
    #[inline]
    pub fn dimension_mismatch(image: (u32, u32), mask: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            image_width: image.0,
            image_height: image.1,
            mask_width: mask.0,
            mask_height: mask.1,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
