use std::{fmt, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::{
    config::{ColumnMapping, IngestConfig},
    error::{Error, Result},
    input::read_file,
    record::{Coordinate, PointRecord, Value},
};

/// The result of ingesting delimited text
#[derive(Debug, Default, PartialEq)]
pub struct Ingested {
    /// One record per accepted row, in input order
    pub records: Vec<PointRecord>,

    /// Number of non-blank data rows that were rejected
    pub skipped: usize,
}

impl Ingested {
    /// Total number of non-blank data rows seen
    pub fn rows(&self) -> usize {
        self.records.len() + self.skipped
    }
}

/// Why a data row was not turned into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// The row does not reach all required columns
    TooFewCells,

    /// The line identifier cell is empty
    MissingLine,

    /// The latitude cell is missing or not a finite number
    InvalidLatitude,

    /// The longitude cell is missing or not a finite number
    InvalidLongitude,

    /// The coordinate is outside of the WGS84 range
    OutOfRange,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowRejection::TooFewCells => "too few cells",
            RowRejection::MissingLine => "empty line identifier",
            RowRejection::InvalidLatitude => "latitude is not a number",
            RowRejection::InvalidLongitude => "longitude is not a number",
            RowRejection::OutOfRange => "coordinate out of range",
        })
    }
}

/// Column indexes resolved from the header row
#[derive(Debug)]
struct Columns {
    line: usize,
    lat: usize,
    lon: usize,
    mileage: Option<usize>,
    name: Option<usize>,
    kind: Option<usize>,
    passthrough: Vec<(String, Option<usize>)>,

    /// A row needs at least this many cells
    required: usize,
}

impl Columns {
    fn resolve(header: &StringRecord, mapping: &ColumnMapping) -> Result<Self> {
        let names = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // the BOM can only appear in front of the first header cell
                let name = if i == 0 {
                    name.trim_start_matches('\u{feff}')
                } else {
                    name
                };
                name.trim().to_lowercase()
            })
            .collect::<Vec<_>>();

        let find = |column: &str| {
            let column = column.trim().to_lowercase();
            names.iter().position(|n| *n == column)
        };
        let require = |column: &str| {
            find(column).ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
            })
        };

        let line = require(mapping.line.as_str())?;
        let lat = require(mapping.lat.as_str())?;
        let lon = require(mapping.lon.as_str())?;
        let mileage = mapping.mileage_column().and_then(find);
        let name = mapping.name_column().and_then(find);
        let kind = mapping.kind_column().and_then(find);
        let passthrough = mapping
            .passthrough
            .iter()
            .map(|column| (column.trim().to_lowercase(), find(column.as_str())))
            .collect();

        let required = [Some(line), Some(lat), Some(lon), mileage]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or_default()
            + 1;

        Ok(Self {
            line,
            lat,
            lon,
            mileage,
            name,
            kind,
            passthrough,
            required,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> std::result::Result<PointRecord, RowRejection> {
        if row.len() < self.required {
            return Err(RowRejection::TooFewCells);
        }

        let line = cell(row, Some(self.line)).ok_or(RowRejection::MissingLine)?;
        let lat = parse_finite(cell(row, Some(self.lat))).ok_or(RowRejection::InvalidLatitude)?;
        let lon = parse_finite(cell(row, Some(self.lon))).ok_or(RowRejection::InvalidLongitude)?;

        let coordinate = Coordinate::new(lon, lat);
        if !coordinate.is_valid() {
            return Err(RowRejection::OutOfRange);
        }

        Ok(PointRecord {
            line: line.to_string(),
            mileage: cell(row, self.mileage).and_then(Value::coerce),
            name: cell(row, self.name).map(str::to_string),
            kind: cell(row, self.kind).map(str::to_string),
            attributes: self
                .passthrough
                .iter()
                .map(|(name, i)| (name.clone(), cell(row, *i).map(str::to_string)))
                .collect(),
            coordinate,
        })
    }
}

/// Returns the non-empty cell at `index`
fn cell(row: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| row.get(i))
        .filter(|value| !value.is_empty())
}

fn parse_finite(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// A line containing nothing but whitespace
fn is_blank(row: &StringRecord) -> bool {
    row.len() == 1 && row.get(0).is_some_and(str::is_empty)
}

/// Converts delimited text with a header row into point records.
///
/// Rows that cannot be converted are counted in [`Ingested::skipped`] and
/// never abort the run. Blank lines are ignored and not counted. Empty text
/// yields an empty result. A required column missing from the header is an
/// error.
pub fn ingest(text: &str, config: &IngestConfig) -> Result<Ingested> {
    if !config.delimiter.is_ascii() {
        return Err(Error::InvalidDelimiter(config.delimiter));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(config.delimiter as u8)
        .from_reader(text.as_bytes());
    let mut rows = reader.records();

    let header = loop {
        match rows.next() {
            Some(row) => {
                let row = row?;
                if !is_blank(&row) {
                    break row;
                }
            }
            None => return Ok(Ingested::default()),
        }
    };
    let columns = Columns::resolve(&header, &config.columns)?;

    let mut result = Ingested::default();
    for row in rows {
        let row = row?;
        if is_blank(&row) {
            continue;
        }

        match columns.parse_row(&row) {
            Ok(record) => result.records.push(record),
            Err(reason) => {
                debug!(
                    line = row.position().map_or(0, |p| p.line()),
                    %reason,
                    "skipping row"
                );
                result.skipped += 1;
            }
        }
    }

    Ok(result)
}

/// Reads and ingests a CSV file. A file without a single data row is an
/// error.
pub fn ingest_file(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Ingested> {
    let path = path.as_ref();
    let text = read_file(path)?;
    let result = ingest(&text, config)?;

    if result.rows() == 0 {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        records = result.records.len(),
        skipped = result.skipped,
        "ingested CSV"
    );

    Ok(result)
}
