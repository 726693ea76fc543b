//! # heal-ops
//!
//! Inpainting operations over RGBA buffers.
//!
//! Given an image and a mask of pixels to replace, produce a new image whose
//! masked region has been filled with plausible content.
//!
//! # Modules
//!
//! - [`diffusion`] - Iterated 8-neighbour averaging (cheap, smooth)
//! - [`synthesis`] - Patch matching from known regions (texture-aware)
//! - [`fill`] - Method selection shared by both fillers
//! - [`preview`] - Transparent preview of the region to be filled
//! - [`session`] - Baseline/mask lifecycle across successive fills
//!
//! # Contract
//!
//! Every filler takes `&RgbaImage` and `&Mask` of identical size and returns a
//! fresh buffer. Pixels outside the mask are never modified; every masked
//! pixel comes back with alpha 255. Neither input is mutated.
//!
//! # Example
//!
//! ```rust
//! use heal_core::{Mask, RgbaImage};
//! use heal_ops::{fill, FillMethod};
//!
//! let image = RgbaImage::filled(64, 64, [255, 0, 0, 255]);
//! let mask = Mask::from_fn(64, 64, |x, y| (20..40).contains(&x) && (20..40).contains(&y));
//!
//! let method: FillMethod = "diffusion".parse().unwrap();
//! let filled = fill(&image, &mask, &method).unwrap();
//! assert_eq!(filled.image, image);
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - Diffusion passes compute rows on the rayon pool.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod diffusion;
pub mod fill;
pub mod preview;
pub mod session;
pub mod synthesis;

pub use diffusion::{diffusion_fill, DiffusionParams, Weighting};
pub use error::{OpsError, OpsResult};
pub use fill::{fill, FillMethod, Filled};
pub use preview::erase_preview;
pub use session::EditSession;
pub use synthesis::{patch_synthesis_fill, PatchSynthesizer, SynthesisParams, SynthesisProgress, SynthesisStats};
