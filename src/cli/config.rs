//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::AlphaArgs;
use crate::{
    color::KeyColor,
    config::{KeyConfig, OutputFormat},
    services::ImageIOService,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// What `alpha` does to each input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphaMode {
    /// Add a fully opaque alpha channel
    Add,
    /// Drop the alpha channel by blending onto a background color
    Remove(KeyColor),
    /// Key out a color
    Transparent(KeyConfig),
}

impl AlphaMode {
    /// Suffix used for default output file names
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Add => "alpha",
            Self::Remove(_) => "noalpha",
            Self::Transparent(_) => "transparent",
        }
    }
}

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the alpha mode from CLI arguments
    pub(crate) fn alpha_mode(args: &AlphaArgs) -> Result<AlphaMode> {
        if let Some(target) = args.transparent {
            let mut builder = KeyConfig::builder()
                .target(target)
                .tolerance(args.tolerance)
                .feather(args.feather)
                .force_scalar(args.scalar);
            if let Some(format) = args.format {
                builder = builder.output_format(format.into());
            }
            let config = builder.build().context("Invalid key settings")?;
            return Ok(AlphaMode::Transparent(config));
        }

        if args.remove {
            return Ok(AlphaMode::Remove(args.background.unwrap_or(KeyColor::WHITE)));
        }

        Ok(AlphaMode::Add)
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_alpha(args: &AlphaArgs) -> Result<()> {
        if args.output.is_some() && args.input.len() > 1 {
            anyhow::bail!(
                "--output can only be used with a single input ({} given)",
                args.input.len()
            );
        }

        if args.format.is_some() && args.transparent.is_none() {
            anyhow::bail!("--format only applies to --transparent");
        }

        Ok(())
    }

    /// Output path for `input`: the explicit `--output`, else `<stem>_<suffix>.<ext>`
    pub(crate) fn output_path(
        args: &AlphaArgs,
        input: &Path,
        suffix: &str,
        format: Option<OutputFormat>,
    ) -> PathBuf {
        args.output
            .clone()
            .unwrap_or_else(|| ImageIOService::output_path(input, suffix, format))
    }
}
