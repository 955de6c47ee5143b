use std::{fs, path::Path};

use crate::error::{Error, Result};

pub mod csv;
pub mod geojson;

/// Reads a whole input file into memory. Inputs are processed as one
/// snapshot, so there is no streaming.
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
