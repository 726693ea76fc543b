//! Erase preview: shows the region about to be filled as transparent.

use heal_core::{ensure_same_size, Mask, MaskThreshold, RgbaImage, CHANNELS};

use crate::OpsResult;

/// Returns a copy of `image` with alpha 0 wherever `mask` is above `threshold`.
///
/// # Errors
///
/// `OpsError::Core` if `image` and `mask` differ in size.
pub fn erase_preview(image: &RgbaImage, mask: &Mask, threshold: MaskThreshold) -> OpsResult<RgbaImage> {
    ensure_same_size(image, mask)?;
    let mut out = image.clone();
    for (px, &m) in out.data_mut().chunks_exact_mut(CHANNELS).zip(mask.data()) {
        if threshold.is_masked(m) {
            px[3] = 0;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_alpha_changes() {
        let image = RgbaImage::filled(3, 1, [10, 20, 30, 255]);
        let mask = Mask::from_fn(3, 1, |x, _| x == 1);
        let out = erase_preview(&image, &mask, MaskThreshold::HARD).unwrap();
        assert_eq!(out.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(out.pixel(1, 0), [10, 20, 30, 0]);
    }

    #[test]
    fn test_mismatch_rejected() {
        assert!(erase_preview(&RgbaImage::new(2, 2), &Mask::new(1, 2), MaskThreshold::HARD).is_err());
    }
}
