use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    input::read_file,
};

/// Top-level configuration, usually read from a TOML file. Every table and
/// key is optional and falls back to the defaults used by the survey data.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub chainage: ChainageConfig,
}

impl Config {
    /// Reads a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_file(path)?;
        toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Controls how delimited text is turned into point records
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// The cell delimiter
    pub delimiter: char,

    /// The output property that receives the line identifier
    pub line_property: String,

    /// Maps record roles to CSV header names
    pub columns: ColumnMapping,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            line_property: "ELR".to_string(),
            columns: ColumnMapping::default(),
        }
    }
}

/// Maps the roles of a [`PointRecord`](crate::record::PointRecord) to CSV
/// column names. Names are matched case-insensitively.
///
/// An optional role set to an empty string is unmapped, which is how a TOML
/// file turns off the default `mileage` column.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnMapping {
    /// Line identifier column (required)
    pub line: String,

    /// Latitude column (required)
    pub lat: String,

    /// Longitude column (required)
    pub lon: String,

    /// Mileage column, coerced to a number where possible. Use
    /// [`ColumnMapping::mileage_column`] to read it.
    pub mileage: Option<String>,

    /// Display name column
    pub name: Option<String>,

    /// Asset category column
    pub kind: Option<String>,

    /// Columns copied verbatim into the output properties
    pub passthrough: Vec<String>,
}

fn mapped(column: &Option<String>) -> Option<&str> {
    column.as_deref().filter(|c| !c.trim().is_empty())
}

impl ColumnMapping {
    /// The mileage column or [`None`] if it is unmapped
    pub fn mileage_column(&self) -> Option<&str> {
        mapped(&self.mileage)
    }

    pub fn name_column(&self) -> Option<&str> {
        mapped(&self.name)
    }

    pub fn kind_column(&self) -> Option<&str> {
        mapped(&self.kind)
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            line: "elr".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            mileage: Some("mileage".to_string()),
            name: None,
            kind: None,
            passthrough: Vec::new(),
        }
    }
}

/// Names of the route feature properties read and written by the
/// [`ChainageEngine`](crate::chainage::ChainageEngine)
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChainageConfig {
    /// Property holding the line identifier
    pub line_property: String,

    /// Property holding the start chainage in miles
    pub from_property: String,

    /// Property holding the end chainage in miles
    pub to_property: String,
}

impl Default for ChainageConfig {
    fn default() -> Self {
        Self {
            line_property: "ELR".to_string(),
            from_property: "L_M_FROM".to_string(),
            to_property: "L_M_TO".to_string(),
        }
    }
}
