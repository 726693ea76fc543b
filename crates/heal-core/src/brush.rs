//! Circular brush stamps for painting fill masks.
//!
//! A hard brush writes full intensity inside its disc. A soft brush keeps a
//! solid core of `radius * hardness` and fades to zero at `radius` with a
//! smoothstep falloff, so its edge pixels land between the
//! [`MaskThreshold::SOFT`](crate::MaskThreshold::SOFT) and
//! [`MaskThreshold::HARD`](crate::MaskThreshold::HARD) cut-offs.
//!
//! Stamps combine with `max`, so repainting never weakens a pixel.
//!
//! # Example
//!
//! ```rust
//! use heal_core::{Brush, Mask, MaskThreshold};
//!
//! let mut mask = Mask::new(64, 64);
//! let brush = Brush::hard(6.0);
//! brush.stroke(&mut mask, (10.0, 10.0), (50.0, 10.0));
//! assert!(mask.is_masked(30, 10, MaskThreshold::HARD));
//! assert!(!mask.is_masked(30, 30, MaskThreshold::HARD));
//! ```

use crate::mask::Mask;
use tracing::trace;

/// Circular mask brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Disc radius in pixels.
    pub radius: f32,
    /// Fraction of the radius painted at full intensity, in [0, 1].
    pub hardness: f32,
}

impl Brush {
    /// A hard-edged brush.
    pub fn hard(radius: f32) -> Self {
        Self { radius, hardness: 1.0 }
    }

    /// A feathered brush with the given hardness.
    pub fn soft(radius: f32, hardness: f32) -> Self {
        Self {
            radius,
            hardness: hardness.clamp(0.0, 1.0),
        }
    }

    /// Stamp intensity at `dist` pixels from the centre.
    fn intensity(&self, dist: f32) -> u8 {
        let r = self.radius.max(0.5);
        if dist > r {
            return 0;
        }
        if self.hardness >= 1.0 {
            return 255;
        }
        let core = r * self.hardness;
        if dist <= core {
            return 255;
        }
        let s = ((dist - core) / (r - core)).clamp(0.0, 1.0);
        let a = 1.0 - s * s * (3.0 - 2.0 * s);
        (a * 255.0).round() as u8
    }

    /// Stamps one disc centred at (cx, cy). Pixels outside the mask are skipped.
    pub fn dab(&self, mask: &mut Mask, cx: f32, cy: f32) {
        if !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let r = self.radius.max(0.5);
        let (w, h) = (mask.width() as i64, mask.height() as i64);
        let x0 = ((cx - r).floor() as i64).max(0);
        let y0 = ((cy - r).floor() as i64).max(0);
        let x1 = ((cx + r).ceil() as i64).min(w - 1);
        let y1 = ((cy + r).ceil() as i64).min(h - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let v = self.intensity((dx * dx + dy * dy).sqrt());
                if v == 0 {
                    continue;
                }
                let (ux, uy) = (x as u32, y as u32);
                if v > mask.value(ux, uy) {
                    mask.set_value(ux, uy, v);
                }
            }
        }
    }

    /// Stamps discs along a segment, spaced at half the radius.
    ///
    /// The segment is first clipped to the mask grown by the radius, so dab
    /// count is bounded by the mask size however far the endpoints lie.
    pub fn stroke(&self, mask: &mut Mask, from: (f32, f32), to: (f32, f32)) {
        let r = self.radius.max(0.5);
        let lo = (-r, -r);
        let hi = (mask.width() as f32 + r, mask.height() as f32 + r);
        let Some((from, to)) = clip_segment(from, to, lo, hi) else {
            return;
        };
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt();
        let spacing = (self.radius * 0.5).max(1.0);
        let steps = (len / spacing).ceil().max(1.0) as u32;
        trace!(len, steps, radius = self.radius, "brush::stroke");

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.dab(mask, from.0 + dx * t, from.1 + dy * t);
        }
    }
}

/// Liang-Barsky clip of a segment to an axis-aligned box.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    lo: (f32, f32),
    hi: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let coords = [from.0, from.1, to.0, to.1];
    if !coords.iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-dx, from.0 - lo.0),
        (dx, hi.0 - from.0),
        (-dy, from.1 - lo.1),
        (dy, hi.1 - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }
    // Rounding at extreme coordinates can land just outside the box.
    let at = |t: f32| {
        (
            (from.0 + t * dx).clamp(lo.0, hi.0),
            (from.1 + t * dy).clamp(lo.1, hi.1),
        )
    };
    Some((at(t0), at(t1)))
}
