//! # heal-core
//!
//! Core types for mask-driven image healing.
//!
//! - [`RgbaImage`] - Row-major RGBA8 pixel buffer
//! - [`Mask`] - 8-bit fill mask painted by the brush
//! - [`MaskThreshold`] - Intensity cut-off deciding what counts as masked
//! - [`Coverage`] - Owned binary working copy consumed by a fill
//! - [`Brush`] - Hard and feathered circular stamps
//! - [`io`] - Raw buffer files (no container formats)
//!
//! ## Crate Structure
//!
//! ```text
//! heal-core (this crate)
//!    ^
//!    +-- heal-ops (diffusion and patch-synthesis fillers)
//!    +-- heal-cli (the `heal` binary)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use heal_core::{Brush, Mask, MaskThreshold, RgbaImage};
//!
//! let image = RgbaImage::filled(32, 32, [40, 80, 120, 255]);
//! let mut mask = Mask::for_image(&image);
//! Brush::hard(4.0).dab(&mut mask, 16.0, 16.0);
//! assert!(mask.is_masked(16, 16, MaskThreshold::HARD));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod brush;
pub mod error;
pub mod image;
pub mod io;
pub mod mask;

pub use brush::Brush;
pub use error::{Error, Result};
pub use image::{RgbaImage, Rgba8, CHANNELS, OPAQUE};
pub use mask::{ensure_same_size, is_masked, Coverage, Mask, MaskThreshold, NEIGHBORS_8};
