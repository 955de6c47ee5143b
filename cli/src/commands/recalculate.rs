use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Args;
use railref_core::{chainage::recalculate_file, config::Config};

use super::{elapsed, report};

/// Recalculate the chainage of a route geometry file in place
#[derive(Args, Debug)]
pub struct RecalculateArgs {
    /// The GeoJSON FeatureCollection to rewrite
    pub input: PathBuf,
}

/// Run the `recalculate` command
pub fn run_recalculate(args: RecalculateArgs, config: &Config) -> Result<()> {
    let start = Instant::now();

    let result = recalculate_file(&args.input, config.chainage.clone())
        .with_context(|| format!("Unable to recalculate `{}'", args.input.display()))?;

    report(&format!(
        "Updated {} segments on {} lines ({} features excluded) in {}",
        result.updated,
        result.lines,
        result.excluded,
        elapsed(start)
    ));

    Ok(())
}
