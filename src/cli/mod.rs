//! CLI module for the chroma-key library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use config::AlphaMode;
pub use main_impl::{main, AlphaArgs, Cli, CliOutputFormat, Command, CompositeArgs};
