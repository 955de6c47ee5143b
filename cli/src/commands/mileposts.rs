use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Args;
use railref_core::{
    config::Config, input::csv::ingest_file, output::geojson::FeatureWriter,
    output::write_json_atomic,
};

use super::{elapsed, report};

/// Build a GeoJSON milepost file from a survey CSV
#[derive(Args, Debug)]
pub struct MilepostsArgs {
    /// The CSV file to read
    pub input: PathBuf,

    /// Where to write the FeatureCollection
    #[arg(short, long, default_value = "mileposts.geojson")]
    pub output: PathBuf,
}

/// Run the `mileposts` command
pub fn run_mileposts(args: MilepostsArgs, config: &Config) -> Result<()> {
    let start = Instant::now();

    let ingested = ingest_file(&args.input, &config.ingest)
        .with_context(|| format!("Unable to ingest `{}'", args.input.display()))?;

    let collection = FeatureWriter::from_config(&config.ingest).collection(&ingested.records);
    write_json_atomic(&args.output, &collection)?;

    report(&format!(
        "Wrote {} features to {} ({} rows skipped) in {}",
        ingested.records.len(),
        args.output.display(),
        ingested.skipped,
        elapsed(start)
    ));

    Ok(())
}
