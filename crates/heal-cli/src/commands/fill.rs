//! Fill command
//!
//! Builds a mask, fills it by diffusion or patch synthesis, and writes the
//! result. `--json` prints a run summary to stdout.

use std::time::Instant;

use anyhow::{Context, Result};
use heal_core::RgbaImage;
use heal_ops::{diffusion_fill, FillMethod, PatchSynthesizer, SynthesisStats, Weighting};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{info, trace};

use crate::FillArgs;

#[derive(Serialize)]
struct FillReport<'a> {
    method: &'a str,
    width: u32,
    height: u32,
    masked: usize,
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<SynthesisStats>,
}

/// Applies the command-line overrides on top of the method's defaults.
fn configure(args: &FillArgs) -> Result<FillMethod> {
    let mut method: FillMethod = args.method.parse()?;
    let threshold = super::resolve_threshold(args.threshold, &args.mask);

    match &mut method {
        FillMethod::Diffusion(p) => {
            p.threshold = threshold;
            p.weighting = args.weighting.parse::<Weighting>()?;
            if let Some(n) = args.iterations {
                p.iterations = n;
            }
        }
        FillMethod::PatchSynthesis(p) => {
            p.threshold = threshold;
            if let Some(size) = args.patch_size {
                p.patch_size = size;
            }
            if let Some(n) = args.samples {
                p.sample_count = n;
            }
            if let Some(n) = args.smoothing {
                p.smoothing_iterations = n;
            }
            if let Some(seed) = args.seed {
                p.seed = seed;
            }
            p.max_passes = args.max_passes;
            p.validate()?;
        }
    }
    Ok(method)
}

pub fn run(args: FillArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), method = %args.method, "fill::run");

    let method = configure(&args)?;
    let image = super::load_image(&args.input, args.size)?;
    let mask = super::build_mask(&args.mask, args.size)?;
    let masked = mask.count_masked(method.threshold());

    info!(%method, masked, width = image.width(), height = image.height(), "Filling");
    if verbose > 0 {
        println!("Filling {} pixels of {} ({})", masked, args.input.display(), method);
    }

    let start = Instant::now();
    let (output, stats) = match &method {
        FillMethod::Diffusion(params) => (diffusion_fill(&image, &mask, params)?, None),
        FillMethod::PatchSynthesis(params) => {
            let synth = PatchSynthesizer::new(&image, &mask, *params)?;
            let mut rng = Pcg32::seed_from_u64(params.seed);
            let (out, stats) = synth.run_with_rng(&mut rng, |progress, _partial: &RgbaImage| {
                info!(
                    pass = progress.pass,
                    resolved = progress.resolved,
                    remaining = progress.remaining,
                    "Synthesis progress"
                );
            });
            (out, Some(stats))
        }
    };
    let elapsed = start.elapsed();

    super::save_image(&args.output, &output)?;

    if args.json {
        let report = FillReport {
            method: method.name(),
            width: image.width(),
            height: image.height(),
            masked,
            elapsed_ms: elapsed.as_millis(),
            synthesis: stats,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else if verbose > 0 {
        if let Some(s) = stats {
            println!(
                "  {} passes, {} patched, {} smoothed, {} unresolved",
                s.passes, s.patch_resolved, s.smoothed, s.unresolved
            );
        }
        println!("Done in {:.2?}.", elapsed);
    }

    Ok(())
}
