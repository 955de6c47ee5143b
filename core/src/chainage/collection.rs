use std::path::Path;

use serde_json::Value as JsonValue;

use crate::{
    error::{Error, Result},
    input::geojson::read_json,
    output::write_json_atomic,
};

/// A route geometry file held as an untyped GeoJSON FeatureCollection.
///
/// Only chainage properties are ever modified. Geometries, unknown
/// properties and foreign members are written back as they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCollection {
    document: JsonValue,
}

impl RouteCollection {
    /// Wraps a JSON document. Returns [`None`] if it is not a
    /// FeatureCollection with a `features` array.
    pub fn new(document: JsonValue) -> Option<Self> {
        let is_collection = document.get("type").and_then(JsonValue::as_str)
            == Some("FeatureCollection")
            && document.get("features").is_some_and(JsonValue::is_array);
        is_collection.then_some(Self { document })
    }

    /// Reads a route collection from a file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = read_json(path)?;
        Self::new(document).ok_or_else(|| Error::NotFeatureCollection {
            path: path.to_path_buf(),
        })
    }

    /// Atomically replaces the file at `path` with this collection
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json_atomic(path, &self.document)
    }

    pub fn features(&self) -> &[JsonValue] {
        self.document["features"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn features_mut(&mut self) -> &mut [JsonValue] {
        match self.document.get_mut("features") {
            Some(JsonValue::Array(features)) => features.as_mut_slice(),
            _ => &mut [],
        }
    }

    pub fn into_json(self) -> JsonValue {
        self.document
    }
}
