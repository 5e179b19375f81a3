//! Chroma Key CLI Tool
//!
//! `alpha` manages the alpha channel (add, remove, key out a color) and
//! `composite` overlays one image on another.

use super::config::{AlphaMode, CliConfigBuilder};
use crate::{
    compose::{self, Placement},
    config::OutputFormat,
    processor::ChromaKeyer,
    services::ImageIOService,
    tracing_config::{init_cli_tracing, spans},
    KeyColor,
};
use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use image::DynamicImage;
use instant::Instant;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Chroma-key and alpha channel tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "chroma-key")]
pub struct Cli {
    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage alpha channel: add, remove, or make a color transparent
    Alpha(AlphaArgs),
    /// Overlay one image on another
    Composite(CompositeArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("mode").required(true).args(["add", "remove", "transparent"])))]
pub struct AlphaArgs {
    /// Image files
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<PathBuf>,

    /// Output path (single input only)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Add an opaque alpha channel
    #[arg(long)]
    pub add: bool,

    /// Remove alpha by flattening onto a background
    #[arg(long)]
    pub remove: bool,

    /// Background color for --remove as R,G,B [default: 255,255,255]
    #[arg(long, value_name = "R,G,B", requires = "remove")]
    pub background: Option<KeyColor>,

    /// Make a color transparent, as R,G,B
    #[arg(long, value_name = "R,G,B")]
    pub transparent: Option<KeyColor>,

    /// Color match tolerance (0-255)
    #[arg(long, default_value_t = 0, requires = "transparent")]
    pub tolerance: u32,

    /// Feather width for antialiased edges and spill suppression (0-255)
    #[arg(long, default_value_t = 0, requires = "transparent")]
    pub feather: u32,

    /// Use the per-pixel fallback matte even when feathering
    #[arg(long, requires = "transparent")]
    pub scalar: bool,

    /// Output format for --transparent [default: from output extension, else png]
    #[arg(short, long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Print processing metadata as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompositeArgs {
    /// Base image file
    pub base: PathBuf,

    /// Overlay image file
    pub overlay: PathBuf,

    /// Output path
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Position: center or X,Y
    #[arg(long, default_value = "center")]
    pub position: Placement,

    /// Resize overlay to WxH before compositing
    #[arg(long, value_name = "WxH", value_parser = parse_overlay_size)]
    pub overlay_size: Option<(u32, u32)>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Webp,
    Tiff,
    Rgba8,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Webp => OutputFormat::WebP,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
            CliOutputFormat::Rgba8 => OutputFormat::Rgba8,
        }
    }
}

fn parse_overlay_size(s: &str) -> std::result::Result<(u32, u32), String> {
    compose::parse_size(s).map_err(|e| e.to_string())
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;
    debug!(?cli, "Parsed arguments");

    match &cli.command {
        Command::Alpha(args) => run_alpha(args),
        Command::Composite(args) => run_composite(args),
    }
}

fn run_alpha(args: &AlphaArgs) -> Result<()> {
    CliConfigBuilder::validate_alpha(args).context("Invalid CLI arguments")?;
    let mode = CliConfigBuilder::alpha_mode(args).context("Failed to build configuration")?;

    let keyer = match &mode {
        AlphaMode::Transparent(config) => Some(
            ChromaKeyer::new(config.clone()).context("Failed to create chroma keyer")?,
        ),
        _ => None,
    };

    let start_time = Instant::now();
    let progress = (args.input.len() > 1).then(|| create_progress_bar(args.input.len()));
    let _batch = spans::batch_processing(args.input.len()).entered();

    let mut failures = 0usize;
    for input in &args.input {
        let outcome = process_alpha_input(args, &mode, keyer.as_ref(), input);
        match outcome {
            Ok(line) => match &progress {
                Some(bar) => bar.println(line),
                None => println!("{}", line),
            },
            Err(e) => {
                failures += 1;
                error!(input = %input.display(), "{:#}", e);
            },
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    info!(
        "Processed {} image(s) in {:.2}s",
        args.input.len() - failures,
        start_time.elapsed().as_secs_f64()
    );

    if failures > 0 {
        anyhow::bail!("{} of {} input(s) failed", failures, args.input.len());
    }
    Ok(())
}

fn process_alpha_input(
    args: &AlphaArgs,
    mode: &AlphaMode,
    keyer: Option<&ChromaKeyer>,
    input: &Path,
) -> Result<String> {
    let _span = spans::file_processing(input, mode.suffix()).entered();

    match (mode, keyer) {
        (AlphaMode::Transparent(config), Some(keyer)) => {
            let format = args.format.map(OutputFormat::from);
            let out = CliConfigBuilder::output_path(args, input, mode.suffix(), format);
            let format = format
                .or_else(|| OutputFormat::from_path(&out))
                .unwrap_or(config.output_format);

            let result = keyer
                .process_file(input)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            result
                .save(&out, format)
                .with_context(|| format!("Failed to save {}", out.display()))?;

            if args.json {
                let json = serde_json::to_string_pretty(&result.metadata)
                    .context("Failed to serialize metadata")?;
                println!("{}", json);
            }

            let stats = &result.metadata.statistics;
            Ok(format!(
                "{}: made {} pixels transparent/semi-transparent => {}",
                input.display(),
                stats.transparent + stats.partial,
                out.display()
            ))
        },
        (AlphaMode::Add, _) => {
            let image = ImageIOService::load_image(input)?;
            let out = CliConfigBuilder::output_path(args, input, mode.suffix(), None);
            let result = DynamicImage::ImageRgba8(compose::add_alpha(&image));
            ImageIOService::save_image(&result, &out)?;
            Ok(format!("{}: added alpha channel => {}", input.display(), out.display()))
        },
        (AlphaMode::Remove(background), _) => {
            let image = ImageIOService::load_image(input)?;
            let out = CliConfigBuilder::output_path(args, input, mode.suffix(), None);
            let result = DynamicImage::ImageRgb8(compose::flatten(&image, *background));
            ImageIOService::save_image(&result, &out)?;
            Ok(format!("{}: removed alpha channel => {}", input.display(), out.display()))
        },
        (AlphaMode::Transparent(_), None) => {
            Err(anyhow::anyhow!("chroma keyer was not initialized"))
        },
    }
}

fn run_composite(args: &CompositeArgs) -> Result<()> {
    let _span = spans::file_processing(&args.base, "composite").entered();

    let base = ImageIOService::load_image(&args.base)
        .with_context(|| format!("Failed to load base image {}", args.base.display()))?;
    let overlay = ImageIOService::load_image(&args.overlay)
        .with_context(|| format!("Failed to load overlay image {}", args.overlay.display()))?;

    let overlay_dims = args.overlay_size.unwrap_or((overlay.width(), overlay.height()));
    let (x, y) = args
        .position
        .offset((base.width(), base.height()), overlay_dims);

    let result = compose::composite(&base, &overlay, args.position, args.overlay_size);
    let out = args
        .output
        .clone()
        .unwrap_or_else(|| ImageIOService::output_path(&args.base, "composite", None));
    ImageIOService::save_image(&DynamicImage::ImageRgba8(result), &out)
        .with_context(|| format!("Failed to save {}", out.display()))?;

    println!(
        "Composited {} onto {} at ({},{}) => {}",
        args.overlay.display(),
        args.base.display(),
        x,
        y,
        out.display()
    );
    Ok(())
}

fn create_progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
