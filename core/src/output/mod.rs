use std::{
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub mod geojson;

/// Writes `value` as pretty-printed JSON to `path`.
///
/// The document is written to a temporary file in the destination directory
/// and then renamed over `path`, so the destination either keeps its old
/// content or receives the complete new one.
pub fn write_json_atomic<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| write_error(e.into()))?;
        writer.write_all(b"\n").map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }
    file.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempdir::TempDir;

    use super::write_json_atomic;
    use crate::Error;

    #[test]
    fn replaces_existing_file() {
        let dir = TempDir::new("railref_output").unwrap();
        let path = dir.path().join("out.geojson");
        fs::write(&path, "old content").unwrap();

        write_json_atomic(&path, &json!({ "type": "FeatureCollection", "features": [] }))
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({ "type": "FeatureCollection", "features": [] }));

        // no temporary files are left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory() {
        let dir = TempDir::new("railref_output").unwrap();
        let path = dir.path().join("missing").join("out.geojson");
        let err = write_json_atomic(&path, &json!({})).unwrap_err();
        assert!(matches!(err, Error::Write { path: p, .. } if p == path));
    }
}
