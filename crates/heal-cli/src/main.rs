//! heal - Healing brush for raw RGBA buffers
//!
//! Paints a fill mask with brush dabs or loads one from disk, then replaces
//! the masked region by diffusion or patch synthesis.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "heal")]
#[command(author, version, about = "Healing brush for raw RGBA buffers")]
#[command(long_about = "
Removes a painted region from an image and synthesizes replacement content.

Images are raw RGBA8 files (width*height*4 bytes, row-major); masks are raw
8-bit files (width*height bytes). No container formats are read or written.

Examples:
  heal fill photo.rgba -o out.rgba -s 640x480 --disc 320,240,25
  heal fill photo.rgba -o out.rgba -s 640x480 -m hole.mask --method diffusion -i 50
  heal fill photo.rgba -o out.rgba -s 640x480 --stroke 10,10,200,40,8 --soft 0.5 --seed 7
  heal erase photo.rgba -o preview.rgba -s 640x480 --disc 100,100,30
  heal mask -o hole.mask -s 640x480 --disc 100,100,30 --disc 140,100,30
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the masked region (diffusion or patch synthesis)
    #[command(visible_alias = "f")]
    Fill(FillArgs),

    /// Write a preview with the masked region made transparent
    #[command(visible_alias = "e")]
    Erase(EraseArgs),

    /// Rasterize brush dabs and strokes into a raw mask file
    #[command(visible_alias = "m")]
    Mask(MaskArgs),
}

/// Mask sources shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct MaskOpts {
    /// Raw 8-bit mask file to start from
    #[arg(short, long)]
    mask: Option<PathBuf>,

    /// Brush dab at X,Y with radius R (repeatable)
    #[arg(long = "disc", value_name = "X,Y,R")]
    discs: Vec<String>,

    /// Brush stroke from X0,Y0 to X1,Y1 with radius R (repeatable)
    #[arg(long = "stroke", value_name = "X0,Y0,X1,Y1,R")]
    strokes: Vec<String>,

    /// Feather brush edges; value is hardness in 0..1
    #[arg(long, value_name = "HARDNESS")]
    soft: Option<f32>,
}

#[derive(Args)]
struct FillArgs {
    /// Input raw RGBA image
    input: PathBuf,

    /// Output raw RGBA image
    #[arg(short, long)]
    output: PathBuf,

    /// Image size as WIDTHxHEIGHT
    #[arg(short, long, value_parser = commands::parse_size)]
    size: (u32, u32),

    #[command(flatten)]
    mask: MaskOpts,

    /// Fill method: diffusion, patch
    #[arg(long, default_value = "patch")]
    method: String,

    /// Mask threshold (default: 128, or 10 with --soft)
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Diffusion passes
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Diffusion weighting: weighted, uniform
    #[arg(long, default_value = "weighted")]
    weighting: String,

    /// Patch side length (odd)
    #[arg(short, long)]
    patch_size: Option<u32>,

    /// Candidate patches sampled per pixel
    #[arg(long)]
    samples: Option<usize>,

    /// Smoothing passes after patch synthesis
    #[arg(long)]
    smoothing: Option<usize>,

    /// Limit the number of boundary passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct EraseArgs {
    /// Input raw RGBA image
    input: PathBuf,

    /// Output raw RGBA image
    #[arg(short, long)]
    output: PathBuf,

    /// Image size as WIDTHxHEIGHT
    #[arg(short, long, value_parser = commands::parse_size)]
    size: (u32, u32),

    #[command(flatten)]
    mask: MaskOpts,

    /// Mask threshold (default: 128, or 10 with --soft)
    #[arg(short, long)]
    threshold: Option<u8>,
}

#[derive(Args)]
struct MaskArgs {
    /// Output raw mask
    #[arg(short, long)]
    output: PathBuf,

    /// Mask size as WIDTHxHEIGHT
    #[arg(short, long, value_parser = commands::parse_size)]
    size: (u32, u32),

    #[command(flatten)]
    mask: MaskOpts,
}

/// Installs the tracing subscriber. `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8, log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_file.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Fill(args) => commands::fill::run(args, cli.verbose),
        Commands::Erase(args) => commands::erase::run(args, cli.verbose),
        Commands::Mask(args) => commands::mask::run(args, cli.verbose),
    }
}
