//! CLI command implementations

pub mod erase;
pub mod fill;
pub mod mask;

use anyhow::{bail, Context, Result};
use heal_core::{Brush, Mask, MaskThreshold, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::MaskOpts;

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got {w}x{h}"));
    }
    Ok((w, h))
}

/// Parses exactly `N` comma-separated numbers.
fn parse_floats<const N: usize>(s: &str, what: &str) -> Result<[f32; N]> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid {what} '{s}'"))?;
    if parts.iter().any(|v| !v.is_finite()) {
        bail!("{what} '{s}' must contain finite numbers");
    }
    match <[f32; N]>::try_from(parts) {
        Ok(values) => Ok(values),
        Err(parts) => bail!("{what} '{s}' needs {N} values, got {}", parts.len()),
    }
}

/// Load a raw RGBA image
pub fn load_image(path: &Path, (width, height): (u32, u32)) -> Result<RgbaImage> {
    heal_core::io::read_rgba(path, width, height)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save a raw RGBA image
pub fn save_image(path: &Path, image: &RgbaImage) -> Result<()> {
    heal_core::io::write_rgba(path, image)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Brush configured by `--soft`, hard otherwise.
fn brush_for(opts: &MaskOpts, radius: f32) -> Brush {
    match opts.soft {
        Some(hardness) => Brush::soft(radius, hardness),
        None => Brush::hard(radius),
    }
}

/// Builds the mask from an optional file plus any dabs and strokes.
pub fn build_mask(opts: &MaskOpts, (width, height): (u32, u32)) -> Result<Mask> {
    let mut mask = match &opts.mask {
        Some(path) => heal_core::io::read_mask(path, width, height)
            .with_context(|| format!("Failed to load mask: {}", path.display()))?,
        None => Mask::new(width, height),
    };

    for disc in &opts.discs {
        let [x, y, r] = parse_floats::<3>(disc, "disc")?;
        brush_for(opts, r).dab(&mut mask, x, y);
    }
    for stroke in &opts.strokes {
        let [x0, y0, x1, y1, r] = parse_floats::<5>(stroke, "stroke")?;
        brush_for(opts, r).stroke(&mut mask, (x0, y0), (x1, y1));
    }

    debug!(
        discs = opts.discs.len(),
        strokes = opts.strokes.len(),
        from_file = opts.mask.is_some(),
        "Mask built"
    );
    Ok(mask)
}

/// Explicit threshold, else the soft threshold for feathered brushes.
pub fn resolve_threshold(explicit: Option<u8>, opts: &MaskOpts) -> MaskThreshold {
    match (explicit, opts.soft) {
        (Some(t), _) => MaskThreshold(t),
        (None, Some(_)) => MaskThreshold::SOFT,
        (None, None) => MaskThreshold::HARD,
    }
}
