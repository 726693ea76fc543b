//! Erase command
//!
//! Writes the input with the masked region made transparent, showing what a
//! fill would replace.

use anyhow::Result;
use heal_ops::erase_preview;
use tracing::{info, trace};

use crate::EraseArgs;

pub fn run(args: EraseArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), "erase::run");

    let image = super::load_image(&args.input, args.size)?;
    let mask = super::build_mask(&args.mask, args.size)?;
    let threshold = super::resolve_threshold(args.threshold, &args.mask);

    let masked = mask.count_masked(threshold);
    info!(masked, threshold = threshold.0, "Erasing");

    let preview = erase_preview(&image, &mask, threshold)?;
    super::save_image(&args.output, &preview)?;

    if verbose > 0 {
        println!("Erased {} pixels -> {}", masked, args.output.display());
    }

    Ok(())
}
