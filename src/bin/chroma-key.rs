//! Chroma Key CLI Tool
//!
//! Command-line interface for chroma-key matting, alpha channel management and
//! compositing.

use chroma_key::cli;

fn main() -> anyhow::Result<()> {
    cli::main()
}
