use std::path::Path;

use geojson::{Feature, GeoJson};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::{
    error::{Error, Result},
    input::read_file,
};

/// Reads a file into an untyped JSON tree. Members the GeoJSON model does
/// not know about are kept, so the tree can be written back unchanged.
pub fn read_json(path: impl AsRef<Path>) -> Result<JsonValue> {
    let path = path.as_ref();
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the features of a GeoJSON FeatureCollection, e.g. a previously
/// written milepost file
pub fn read_point_features(path: impl AsRef<Path>) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let text = read_file(path)?;
    let geojson = text.parse::<GeoJson>().map_err(|source| Error::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            info!(
                path = %path.display(),
                features = collection.features.len(),
                "read feature collection"
            );
            Ok(collection.features)
        }
        _ => Err(Error::NotFeatureCollection {
            path: path.to_path_buf(),
        }),
    }
}
