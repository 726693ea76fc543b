//! Filler selection.
//!
//! Both fillers share one contract: image + mask in, new image out. A
//! [`FillMethod`] picks one of them and carries its parameters, and [`fill`]
//! hands back the new baseline together with the cleared mask the caller
//! should continue editing with.
//!
//! # Example
//!
//! ```rust
//! use heal_core::{Mask, MaskThreshold, RgbaImage};
//! use heal_ops::fill::{fill, FillMethod};
//!
//! let image = RgbaImage::filled(16, 16, [30, 30, 30, 255]);
//! let mask = Mask::from_fn(16, 16, |x, y| x == 8 && y == 8);
//! let method: FillMethod = "patch".parse().unwrap();
//!
//! let filled = fill(&image, &mask, &method).unwrap();
//! assert!(filled.mask.is_clear(MaskThreshold::SOFT));
//! assert_eq!(filled.image.pixel(8, 8), [30, 30, 30, 255]);
//! ```

use std::fmt;
use std::str::FromStr;

use heal_core::{Mask, MaskThreshold, RgbaImage};
use tracing::debug;

use crate::diffusion::{diffusion_fill, DiffusionParams};
use crate::synthesis::{patch_synthesis_fill, SynthesisParams};
use crate::{OpsError, OpsResult};

/// Which filler to run, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    /// Neighbour-averaging diffusion.
    Diffusion(DiffusionParams),
    /// Patch-based texture synthesis.
    PatchSynthesis(SynthesisParams),
}

impl FillMethod {
    /// Short name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            FillMethod::Diffusion(_) => "diffusion",
            FillMethod::PatchSynthesis(_) => "patch",
        }
    }

    /// Mask threshold the method was configured with.
    pub fn threshold(&self) -> MaskThreshold {
        match self {
            FillMethod::Diffusion(p) => p.threshold,
            FillMethod::PatchSynthesis(p) => p.threshold,
        }
    }
}

impl Default for FillMethod {
    fn default() -> Self {
        FillMethod::PatchSynthesis(SynthesisParams::default())
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FillMethod {
    type Err = OpsError;

    /// Parses a method name into that method with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diffusion" | "diffuse" | "average" => Ok(FillMethod::Diffusion(DiffusionParams::default())),
            "patch" | "synthesis" | "texture" => Ok(FillMethod::PatchSynthesis(SynthesisParams::default())),
            other => Err(OpsError::InvalidParameter(format!(
                "unknown fill method '{other}' (expected diffusion or patch)"
            ))),
        }
    }
}

/// Result of a fill: the new baseline and a cleared mask of the same size.
#[derive(Debug, Clone)]
pub struct Filled {
    /// Filled image.
    pub image: RgbaImage,
    /// All-zero mask ready for further editing.
    pub mask: Mask,
}

/// Runs the selected filler.
///
/// # Errors
///
/// Propagates the precondition errors of the chosen filler.
pub fn fill(image: &RgbaImage, mask: &Mask, method: &FillMethod) -> OpsResult<Filled> {
    debug!(%method, width = image.width(), height = image.height(), "fill");
    let image = match method {
        FillMethod::Diffusion(params) => diffusion_fill(image, mask, params)?,
        FillMethod::PatchSynthesis(params) => patch_synthesis_fill(image, mask, params)?,
    };
    let mask = Mask::new(mask.width(), mask.height());
    Ok(Filled { image, mask })
}
