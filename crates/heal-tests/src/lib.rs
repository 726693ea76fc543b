//! Integration tests for heal crates.
//!
//! End-to-end checks of both fillers through the public `heal-ops` API, plus
//! raw file round-trips through `heal-core::io`.

#[cfg(test)]
mod tests {
    use heal_core::{Brush, Mask, MaskThreshold, RgbaImage, OPAQUE};
    use heal_ops::{
        diffusion_fill, fill, patch_synthesis_fill, DiffusionParams, EditSession, FillMethod,
        PatchSynthesizer, SynthesisParams,
    };
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use tempfile::tempdir;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [20, 40, 220, 255];
    const GREEN: [u8; 4] = [30, 200, 60, 255];

    /// Deterministic noise with varied alpha.
    fn noise(width: u32, height: u32, seed: u64) -> RgbaImage {
        let mut rng = Pcg32::seed_from_u64(seed);
        let data = (0..width * height * 4).map(|_| rng.random::<u8>()).collect();
        RgbaImage::from_data(width, height, data).unwrap()
    }

    fn disc_mask(width: u32, height: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        Brush::hard(4.0).dab(&mut mask, 10.0, 12.0);
        Brush::hard(3.0).stroke(&mut mask, (20.0, 5.0), (28.0, 25.0));
        mask
    }

    fn methods() -> Vec<FillMethod> {
        vec![
            FillMethod::Diffusion(DiffusionParams::default()),
            FillMethod::PatchSynthesis(SynthesisParams::default()),
            FillMethod::PatchSynthesis(SynthesisParams {
                patch_size: 3,
                sample_count: 50,
                ..SynthesisParams::default()
            }),
        ]
    }

    #[test]
    fn test_clear_mask_is_identity() {
        let image = noise(17, 11, 1);
        let mask = Mask::for_image(&image);
        for method in methods() {
            let filled = fill(&image, &mask, &method).unwrap();
            assert_eq!(filled.image, image, "{method} changed an unmasked image");
        }
    }

    #[test]
    fn test_containment_and_full_coverage() {
        let image = noise(36, 30, 2);
        let mask = disc_mask(36, 30);
        assert!(mask.count_masked(MaskThreshold::HARD) > 0);

        for method in methods() {
            let filled = fill(&image, &mask, &method).unwrap();
            for (x, y, before) in image.pixels() {
                let after = filled.image.pixel(x, y);
                if mask.is_masked(x, y, MaskThreshold::HARD) {
                    assert_eq!(after[3], OPAQUE, "{method} left ({x},{y}) translucent");
                } else {
                    assert_eq!(after, before, "{method} touched ({x},{y}) outside the mask");
                }
            }
            assert_eq!(filled.mask.dimensions(), mask.dimensions());
            assert!(filled.mask.is_clear(MaskThreshold(0)));
        }
    }

    #[test]
    fn test_inputs_not_mutated() {
        let image = noise(24, 24, 3);
        let mask = disc_mask(24, 24);
        let (image_copy, mask_copy) = (image.clone(), mask.clone());
        for method in methods() {
            fill(&image, &mask, &method).unwrap();
        }
        assert_eq!(image, image_copy);
        assert_eq!(mask.data(), mask_copy.data());
    }

    #[test]
    fn test_diffusion_converges_on_uniform_border() {
        let border = [90, 17, 203, 255];
        let mut image = RgbaImage::filled(7, 7, border);
        let mask = Mask::from_fn(7, 7, |x, y| (2..5).contains(&x) && (3..6).contains(&y));
        for (x, y) in [(2, 3), (3, 4), (4, 5), (3, 3)] {
            image.set_pixel(x, y, [0, 255, 0, 10]);
        }

        let out = diffusion_fill(&image, &mask, &DiffusionParams::default()).unwrap();
        assert_eq!(out, RgbaImage::filled(7, 7, border));
    }

    #[test]
    fn test_patch_match_stays_inside_region() {
        // Left half blue, right half green; hole well inside the blue half.
        let mut image = RgbaImage::new(60, 30);
        for y in 0..30 {
            for x in 0..60 {
                image.set_pixel(x, y, if x < 30 { BLUE } else { GREEN });
            }
        }
        let hole = |x: u32, y: u32| (10..14).contains(&x) && (12..16).contains(&y);
        for y in 12..16 {
            for x in 10..14 {
                image.set_pixel(x, y, [0, 0, 0, 0]);
            }
        }
        let mask = Mask::from_fn(60, 30, hole);

        let (out, stats) = PatchSynthesizer::new(&image, &mask, SynthesisParams::default())
            .unwrap()
            .run();
        assert_eq!(stats.patch_resolved, 16);
        assert_eq!(stats.unresolved, 0);
        for y in 12..16 {
            for x in 10..14 {
                assert_eq!(out.pixel(x, y), BLUE, "({x},{y}) picked up the other region");
            }
        }
    }

    #[test]
    fn test_uniform_red_square_hole() {
        let image = RgbaImage::filled(100, 100, RED);
        let mask = Mask::from_fn(100, 100, |x, y| (40..60).contains(&x) && (40..60).contains(&y));

        let diffused = diffusion_fill(&image, &mask, &DiffusionParams::with_iterations(30)).unwrap();
        assert_eq!(diffused, image);

        let params = SynthesisParams {
            patch_size: 7,
            sample_count: 200,
            ..SynthesisParams::default()
        };
        let synthesized = patch_synthesis_fill(&image, &mask, &params).unwrap();
        assert_eq!(synthesized, image);
    }

    #[test]
    fn test_fully_masked_keeps_rgb() {
        let image = noise(9, 6, 4);
        let mask = Mask::from_fn(9, 6, |_, _| true);
        for method in methods() {
            let out = fill(&image, &mask, &method).unwrap().image;
            for ((_, _, a), (_, _, b)) in image.pixels().zip(out.pixels()) {
                assert_eq!(a[..3], b[..3], "{method} invented colour from nothing");
                assert_eq!(b[3], OPAQUE);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_rejected_by_both() {
        let image = RgbaImage::new(8, 8);
        let mask = Mask::new(8, 9);
        for method in methods() {
            let err = fill(&image, &mask, &method).unwrap_err();
            assert!(err.to_string().contains("8x9"), "{err}");
        }
    }

    #[test]
    fn test_raw_roundtrip_then_fill() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("in.rgba");
        let mask_path = dir.path().join("hole.mask");
        let out_path = dir.path().join("out.rgba");

        let image = noise(32, 20, 5);
        let mask = disc_mask(32, 20);
        heal_core::io::write_rgba(&image_path, &image).unwrap();
        heal_core::io::write_mask(&mask_path, &mask).unwrap();

        let loaded = heal_core::io::read_rgba(&image_path, 32, 20).unwrap();
        let loaded_mask = heal_core::io::read_mask(&mask_path, 32, 20).unwrap();
        assert_eq!(loaded, image);
        assert_eq!(loaded_mask.data(), mask.data());

        let filled = fill(&loaded, &loaded_mask, &FillMethod::default()).unwrap();
        heal_core::io::write_rgba(&out_path, &filled.image).unwrap();
        assert_eq!(std::fs::metadata(&out_path).unwrap().len(), 32 * 20 * 4);

        // Wrong size is a dimension error, not a short read.
        assert!(heal_core::io::read_rgba(&image_path, 31, 20).is_err());
    }

    #[test]
    fn test_session_repeated_fills() {
        let mut session = EditSession::new(RgbaImage::filled(40, 40, BLUE));
        session.stroke(&Brush::soft(4.0, 0.5), (5.0, 5.0), (30.0, 30.0));
        let method = FillMethod::Diffusion(DiffusionParams {
            threshold: MaskThreshold::SOFT,
            ..DiffusionParams::default()
        });
        session.apply(&method).unwrap();
        assert_eq!(session.image(), &RgbaImage::filled(40, 40, BLUE));

        session.paint(&Brush::hard(6.0), 20.0, 20.0);
        let preview = session.preview(MaskThreshold::HARD).unwrap();
        assert_eq!(preview.pixel(20, 20)[3], 0);
        session.apply(&FillMethod::default()).unwrap();

        assert_eq!(session.fill_count(), 2);
        assert!(session.mask().is_clear(MaskThreshold(0)));
        assert_eq!(session.into_image(), RgbaImage::filled(40, 40, BLUE));
    }

    #[test]
    fn test_stats_serialize() {
        let image = noise(20, 20, 6);
        let mask = disc_mask(20, 20);
        let (_, stats) = PatchSynthesizer::new(&image, &mask, SynthesisParams::default())
            .unwrap()
            .run();
        let json = serde_json::to_value(stats).unwrap();
        let total = mask.count_masked(MaskThreshold::HARD) as u64;
        let sum = ["patch_resolved", "smoothed", "unresolved"]
            .iter()
            .map(|k| json[k].as_u64().unwrap())
            .sum::<u64>();
        assert_eq!(sum, total);
    }
}
