use anyhow::{Context, Result};

use super::{args::Arguments, report};
use crate::{
    config::load_config,
    core::{RunSummary, pipeline},
};

/// Load the project config and run the whole extraction.
///
/// Progress is printed as the work happens, so the lines emitted before a
/// failure stay on screen as a partial trace.
pub fn run(args: &Arguments) -> Result<RunSummary> {
    let root = &args.root;
    if !root.is_dir() {
        anyhow::bail!("Project root is not a directory: {}", root.display());
    }

    let loaded = load_config(root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;
    if args.verbose && loaded.from_file {
        report::print_config_notice();
    }

    let verbose = args.verbose;
    pipeline::run(root, &loaded.config, &|event| {
        report::print_progress(event, verbose)
    })
}
