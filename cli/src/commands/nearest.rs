use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use geojson::Feature;
use railref_core::{
    config::Config,
    input::{csv::ingest_file, geojson::read_point_features},
    output::geojson::FeatureWriter,
    proximity::ProximityIndex,
    record::Coordinate,
};
use serde_json::{json, Value as JsonValue};

/// Find the point feature closest to a position
#[derive(Args, Debug)]
pub struct NearestArgs {
    /// A survey CSV or a GeoJSON FeatureCollection of points
    pub points: PathBuf,

    /// Longitude of the query position
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Latitude of the query position
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Only consider features on this line
    #[arg(long)]
    pub line: Option<String>,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Loads point features from either a CSV or a GeoJSON file
fn load_features(path: &Path, config: &Config) -> Result<Vec<Feature>> {
    if is_csv(path) {
        let ingested = ingest_file(path, &config.ingest)?;
        let writer = FeatureWriter::from_config(&config.ingest);
        Ok(ingested.records.iter().map(|r| writer.feature(r)).collect())
    } else {
        Ok(read_point_features(path)?)
    }
}

fn line_of<'a>(feature: &'a Feature, property: &str) -> Option<&'a JsonValue> {
    feature.properties.as_ref()?.get(property)
}

/// Run the `nearest` command
pub fn run_nearest(args: NearestArgs, config: &Config) -> Result<()> {
    let query = Coordinate::new(args.lon, args.lat);
    if !query.is_valid() {
        bail!("Invalid query position ({}, {})", args.lon, args.lat);
    }

    let mut features = load_features(&args.points, config)
        .with_context(|| format!("Unable to load points from `{}'", args.points.display()))?;

    if let Some(line) = &args.line {
        let property = &config.ingest.line_property;
        features.retain(|f| match line_of(f, property) {
            Some(JsonValue::String(s)) => s == line,
            Some(JsonValue::Number(n)) => n.to_string() == *line,
            _ => false,
        });
    }

    let Some(nearest) = ProximityIndex::new(&features).nearest(query) else {
        match &args.line {
            Some(line) => bail!("No point feature found on line `{line}'"),
            None => bail!("No point feature found"),
        }
    };

    let output = json!({
        "distance": nearest.distance,
        "properties": nearest.item.properties,
        "geometry": nearest.item.geometry,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
