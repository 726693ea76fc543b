//! Mask command: rasterizes brush input into a raw 8-bit mask file.

use anyhow::{Context, Result};
use heal_core::MaskThreshold;
use tracing::{info, trace};

use crate::MaskArgs;

pub fn run(args: MaskArgs, verbose: u8) -> Result<()> {
    trace!(output = %args.output.display(), "mask::run");

    let mask = super::build_mask(&args.mask, args.size)?;
    heal_core::io::write_mask(&args.output, &mask)
        .with_context(|| format!("Failed to save mask: {}", args.output.display()))?;

    let painted = mask.count_masked(MaskThreshold(0));
    info!(painted, "Mask written");
    if verbose > 0 {
        println!(
            "Wrote {}x{} mask ({} painted) -> {}",
            mask.width(),
            mask.height(),
            painted,
            args.output.display()
        );
    }

    Ok(())
}
