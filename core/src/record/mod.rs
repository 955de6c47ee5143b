use geo::Point;

pub use self::value::Value;

pub mod value;

/// A WGS84 position in degrees. Longitude comes first, as in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Checks that both components are finite and within the WGS84 range
    ///
    /// ```rust
    /// use railref_core::record::Coordinate;
    ///
    /// assert!(Coordinate::new(-2.2, 53.1).is_valid());
    /// assert!(!Coordinate::new(-2.2, 91.0).is_valid());
    /// assert!(!Coordinate::new(181.0, 0.0).is_valid());
    /// assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Reads a GeoJSON position. Returns [`None`] if the position has fewer
    /// than two components or if one of them is not finite. Additional
    /// components (e.g. elevation) are ignored.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Self::new(*lon, *lat)),
            _ => None,
        }
    }

    /// Same as [`Coordinate::from_position`] but for an untyped JSON value.
    /// Anything that is not an array of at least two numbers yields
    /// [`None`].
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let position = value.as_array()?;
        let lon = position.first()?.as_f64()?;
        let lat = position.get(1)?.as_f64()?;
        Some(Self::new(lon, lat))
    }

    /// Returns the coordinate as a GeoJSON position `[lon, lat]`
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Coordinate::new(p.x(), p.y())
    }
}

/// A point asset built from one CSV row
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// The line identifier (ELR). Never empty.
    pub line: String,

    /// The coerced mileage or [`None`] if the row had no mileage
    pub mileage: Option<Value>,

    /// Optional display name
    pub name: Option<String>,

    /// Optional asset category
    pub kind: Option<String>,

    /// Additional columns copied from the source row, in mapping order
    pub attributes: Vec<(String, Option<String>)>,

    /// The asset's position
    pub coordinate: Coordinate,
}
