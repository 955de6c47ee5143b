use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort an ingestion or recalculation run. Problems with
/// individual rows or geometries are never reported through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file could not be read
    #[error("unable to read `{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written
    #[error("unable to write `{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV file does not contain a single data row
    #[error("`{}' does not contain any data rows", .path.display())]
    EmptyInput { path: PathBuf },

    /// A column required by the column mapping is not in the CSV header
    #[error("required column `{column}' not found in CSV header")]
    MissingColumn { column: String },

    /// The configured delimiter is not a single-byte character
    #[error("unsupported delimiter `{0}', only ASCII characters are allowed")]
    InvalidDelimiter(char),

    /// The delimited text could not be tokenized
    #[error("malformed CSV input")]
    Csv(#[from] csv::Error),

    /// The file is not valid JSON
    #[error("`{}' is not a valid JSON document", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is JSON but not valid GeoJSON
    #[error("`{}' is not a valid GeoJSON document", .path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    /// The GeoJSON document is not a feature collection
    #[error("`{}' is not a GeoJSON FeatureCollection", .path.display())]
    NotFeatureCollection { path: PathBuf },

    /// The configuration file could not be parsed
    #[error("malformed configuration file `{}'", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
