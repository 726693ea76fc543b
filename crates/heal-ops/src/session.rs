//! Edit session: one baseline image, one mask, fills applied in sequence.
//!
//! The session follows the edit lifecycle: the mask starts clear, brush
//! strokes paint into it, a successful fill replaces the baseline wholesale
//! and clears the mask again.
//!
//! # Example
//!
//! ```rust
//! use heal_core::{Brush, MaskThreshold, RgbaImage};
//! use heal_ops::{EditSession, FillMethod};
//!
//! let mut session = EditSession::new(RgbaImage::filled(48, 48, [200, 180, 20, 255]));
//! session.paint(&Brush::hard(5.0), 24.0, 24.0);
//! assert!(!session.mask().is_clear(MaskThreshold::HARD));
//!
//! session.apply(&FillMethod::default()).unwrap();
//! assert!(session.mask().is_clear(MaskThreshold::SOFT));
//! ```

use heal_core::{Brush, Mask, MaskThreshold, RgbaImage};
use tracing::{debug, info};

use crate::fill::{fill, FillMethod};
use crate::preview::erase_preview;
use crate::OpsResult;

/// Baseline image plus the mask being painted over it.
#[derive(Debug, Clone)]
pub struct EditSession {
    image: RgbaImage,
    mask: Mask,
    fills: usize,
}

impl EditSession {
    /// Starts a session with a clear mask.
    pub fn new(image: RgbaImage) -> Self {
        let mask = Mask::for_image(&image);
        Self { image, mask, fills: 0 }
    }

    /// Current baseline.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Current mask.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Number of fills applied so far.
    pub fn fill_count(&self) -> usize {
        self.fills
    }

    /// Stamps one brush dab into the mask.
    pub fn paint(&mut self, brush: &Brush, x: f32, y: f32) {
        brush.dab(&mut self.mask, x, y);
    }

    /// Paints a brush stroke between two points.
    pub fn stroke(&mut self, brush: &Brush, from: (f32, f32), to: (f32, f32)) {
        brush.stroke(&mut self.mask, from, to);
    }

    /// Baseline with the masked region made transparent.
    pub fn preview(&self, threshold: MaskThreshold) -> OpsResult<RgbaImage> {
        erase_preview(&self.image, &self.mask, threshold)
    }

    /// Discards the painted mask.
    pub fn reset_mask(&mut self) {
        self.mask.clear();
    }

    /// Fills the masked region and makes the result the new baseline.
    ///
    /// A mask with nothing above the method's threshold leaves the session
    /// untouched.
    pub fn apply(&mut self, method: &FillMethod) -> OpsResult<&RgbaImage> {
        if self.mask.is_clear(method.threshold()) {
            debug!(%method, "Mask is clear, nothing to fill");
            return Ok(&self.image);
        }
        let filled = fill(&self.image, &self.mask, method)?;
        self.image = filled.image;
        self.mask = filled.mask;
        self.fills += 1;
        info!(%method, fills = self.fills, "Fill applied");
        Ok(&self.image)
    }

    /// Ends the session, returning the baseline.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
