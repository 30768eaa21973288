//! CLI argument definitions using clap.
//!
//! The tool has a single action: running it with no arguments extracts the
//! application template and every lesson template from the current directory.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    /// Project root containing the UI and course directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Print every file as it is scanned
    #[arg(short, long)]
    pub verbose: bool,
}
