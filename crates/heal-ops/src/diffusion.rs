//! Neighbour-averaging diffusion fill.
//!
//! Every masked pixel is repeatedly replaced by the average of its *known*
//! 8-neighbours. A pixel is known if it was never masked or if it received a
//! value in an earlier pass, so colour flows inward from the mask edge one
//! ring per pass and keeps relaxing afterwards.
//!
//! Passes are Jacobi-style: all reads come from the buffer as it was at the
//! start of the pass and all writes go to a scratch buffer, so the result does
//! not depend on scan order. That also makes each row of a pass independent,
//! which the `parallel` feature exploits.
//!
//! # Weighting
//!
//! ```text
//! Weighted        Uniform
//! 1 2 1           1 1 1
//! 2 . 2           1 . 1
//! 1 2 1           1 1 1
//! ```
//!
//! # Degenerate input
//!
//! A masked pixel with no known neighbour keeps its current value for that
//! pass. If no unmasked pixel exists anywhere, nothing is ever reached and the
//! RGB data comes back unchanged; only alpha is forced to 255.
//!
//! # Example
//!
//! ```rust
//! use heal_core::{Mask, RgbaImage};
//! use heal_ops::diffusion::{diffusion_fill, DiffusionParams};
//!
//! let mut image = RgbaImage::filled(9, 9, [10, 200, 30, 255]);
//! image.set_pixel(4, 4, [0, 0, 0, 0]);
//! let mask = Mask::from_fn(9, 9, |x, y| x == 4 && y == 4);
//!
//! let filled = diffusion_fill(&image, &mask, &DiffusionParams::default()).unwrap();
//! assert_eq!(filled.pixel(4, 4), [10, 200, 30, 255]);
//! ```

use std::str::FromStr;

use heal_core::{ensure_same_size, Coverage, Mask, MaskThreshold, RgbaImage, CHANNELS, NEIGHBORS_8, OPAQUE};
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Neighbour weighting used by a diffusion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Orthogonal neighbours weigh 2, diagonal neighbours weigh 1.
    #[default]
    Weighted,
    /// All eight neighbours weigh 1.
    Uniform,
}

impl Weighting {
    #[inline]
    fn weight(self, dx: i32, dy: i32) -> u32 {
        match self {
            Weighting::Weighted if dx == 0 || dy == 0 => 2,
            _ => 1,
        }
    }
}

impl FromStr for Weighting {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" | "w" => Ok(Weighting::Weighted),
            "uniform" | "u" => Ok(Weighting::Uniform),
            other => Err(OpsError::InvalidParameter(format!(
                "unknown weighting '{other}' (expected weighted or uniform)"
            ))),
        }
    }
}

/// Diffusion fill configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionParams {
    /// Number of Jacobi passes.
    pub iterations: usize,
    /// Neighbour weighting.
    pub weighting: Weighting,
    /// Mask intensity threshold.
    pub threshold: MaskThreshold,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            iterations: 30,
            weighting: Weighting::Weighted,
            threshold: MaskThreshold::HARD,
        }
    }
}

impl DiffusionParams {
    /// Default parameters with a different pass budget.
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }
}

/// Outcome of [`relax`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RelaxStats {
    /// Passes actually run (stops early once a pass changes nothing).
    pub passes: usize,
    /// Region pixels that never had a known neighbour.
    pub unreached: usize,
}

/// Fills masked pixels by iterated neighbour averaging.
///
/// Returns a new buffer; `image` and `mask` are not modified. Pixels outside
/// the mask are copied through untouched and every masked pixel comes back
/// with alpha 255.
///
/// # Errors
///
/// Returns `OpsError::Core` if `image` and `mask` differ in size.
pub fn diffusion_fill(image: &RgbaImage, mask: &Mask, params: &DiffusionParams) -> OpsResult<RgbaImage> {
    trace!(
        width = image.width(),
        height = image.height(),
        iterations = params.iterations,
        weighting = ?params.weighting,
        "diffusion_fill"
    );
    ensure_same_size(image, mask)?;

    let region = mask.coverage(params.threshold);
    let mut out = image.clone();
    let stats = relax(&mut out, &region, params.weighting, params.iterations);
    force_opaque(&mut out, &region);

    debug!(
        masked = region.count(),
        passes = stats.passes,
        unreached = stats.unreached,
        "Diffusion fill done"
    );
    Ok(out)
}

/// Sets alpha to 255 at every pixel of `region`.
pub(crate) fn force_opaque(image: &mut RgbaImage, region: &Coverage) {
    let data = image.data_mut();
    for (px, &masked) in data.chunks_exact_mut(CHANNELS).zip(region.cells()) {
        if masked {
            px[3] = OPAQUE;
        }
    }
}

/// Read-only state shared by every row of one pass.
struct Pass<'a> {
    src: &'a [u8],
    known: &'a [bool],
    region: &'a [bool],
    width: usize,
    height: usize,
    weighting: Weighting,
}

impl Pass<'_> {
    /// Recomputes the region pixels of row `y` into `dst`, marking newly
    /// reached pixels in `reached`. Returns `true` if anything changed.
    fn row(&self, y: usize, dst: &mut [u8], reached: &mut [bool]) -> bool {
        let mut changed = false;
        for x in 0..self.width {
            let i = y * self.width + x;
            if !self.region[i] {
                continue;
            }

            let mut sum = [0u32; 3];
            let mut total = 0u32;
            for &(dx, dy) in &NEIGHBORS_8 {
                let nx = x as isize + dx as isize;
                let ny = y as isize + dy as isize;
                if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
                    continue;
                }
                let ni = ny as usize * self.width + nx as usize;
                if !self.known[ni] {
                    continue;
                }
                let w = self.weighting.weight(dx, dy);
                let o = ni * CHANNELS;
                for c in 0..3 {
                    sum[c] += self.src[o + c] as u32 * w;
                }
                total += w;
            }
            if total == 0 {
                continue;
            }

            let o = x * CHANNELS;
            for c in 0..3 {
                let v = ((sum[c] + total / 2) / total) as u8;
                if dst[o + c] != v {
                    dst[o + c] = v;
                    changed = true;
                }
            }
            if !reached[x] {
                reached[x] = true;
                changed = true;
            }
        }
        changed
    }
}

/// Runs up to `iterations` Jacobi passes over the pixels of `region`.
///
/// Only RGB is written; alpha is left to the caller. Stops early once a pass
/// neither changes a value nor reaches a new pixel.
pub(crate) fn relax(
    image: &mut RgbaImage,
    region: &Coverage,
    weighting: Weighting,
    iterations: usize,
) -> RelaxStats {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let cells = region.cells();
    let mut stats = RelaxStats::default();

    if width == 0 || height == 0 || region.is_empty() {
        return stats;
    }

    let row_len = width * CHANNELS;
    let mut cur = image.data().to_vec();
    let mut next = cur.clone();
    let mut known: Vec<bool> = cells.iter().map(|&m| !m).collect();
    let mut next_known = known.clone();

    for _ in 0..iterations {
        next.copy_from_slice(&cur);
        next_known.copy_from_slice(&known);
        let pass = Pass {
            src: &cur,
            known: &known,
            region: cells,
            width,
            height,
            weighting,
        };

        #[cfg(feature = "parallel")]
        let changed = {
            use rayon::prelude::*;
            next.par_chunks_mut(row_len)
                .zip(next_known.par_chunks_mut(width))
                .enumerate()
                .map(|(y, (row, reached))| pass.row(y, row, reached))
                .reduce(|| false, |a, b| a | b)
        };
        #[cfg(not(feature = "parallel"))]
        let changed = next
            .chunks_mut(row_len)
            .zip(next_known.chunks_mut(width))
            .enumerate()
            .fold(false, |acc, (y, (row, reached))| pass.row(y, row, reached) | acc);

        std::mem::swap(&mut cur, &mut next);
        std::mem::swap(&mut known, &mut next_known);
        stats.passes += 1;
        trace!(pass = stats.passes, changed, "relax pass");
        if !changed {
            break;
        }
    }

    image.data_mut().copy_from_slice(&cur);
    stats.unreached = cells.iter().zip(&known).filter(|&(&m, &k)| m && !k).count();
    stats
}
