use itertools::Itertools;
use serde_json::Value as JsonValue;

use crate::record::Coordinate;

/// Mean Earth radius in meters used by the haversine formula
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Length of a statute mile in meters
pub const METERS_PER_MILE: f64 = 1609.344;

/// Great-circle distance between `a` and `b` in meters (haversine).
///
/// The square root argument is clamped to `[0, 1]` so that rounding errors
/// for near-antipodal points never leave the domain of `asin`.
///
/// ```rust
/// use railref_core::{record::Coordinate, util::geodesic::distance};
///
/// let a = Coordinate::new(-2.639, 53.480);
/// assert_eq!(distance(a, a), 0.0);
///
/// let b = Coordinate::new(-2.629, 53.480);
/// assert_eq!(distance(a, b), distance(b, a));
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Sums the distances between consecutive coordinates. A pair in which
/// either coordinate is missing contributes nothing, the remaining pairs
/// are still counted.
pub fn line_length<I>(coords: I) -> f64
where
    I: IntoIterator<Item = Option<Coordinate>>,
{
    coords
        .into_iter()
        .tuple_windows()
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some(distance(a, b)),
            _ => None,
        })
        .sum()
}

/// Length in meters of a GeoJSON geometry object.
///
/// `LineString`s and `MultiLineString`s are measured. Every other geometry
/// type, a `null` geometry, or a geometry without `coordinates` has a
/// length of 0. Malformed positions inside a line are treated as missing.
pub fn geometry_length(geometry: &JsonValue) -> f64 {
    let Some(coordinates) = geometry.get("coordinates") else {
        return 0.0;
    };

    match geometry.get("type").and_then(JsonValue::as_str) {
        Some("LineString") => json_line_length(coordinates),
        Some("MultiLineString") => coordinates
            .as_array()
            .map(|lines| lines.iter().map(json_line_length).sum())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

fn json_line_length(line: &JsonValue) -> f64 {
    match line.as_array() {
        Some(positions) => line_length(positions.iter().map(Coordinate::from_json)),
        None => 0.0,
    }
}

/// Rounds `value` to the given number of decimal places
///
/// ```rust
/// use railref_core::util::geodesic::round_to;
///
/// assert_eq!(round_to(1.23456789, 6), 1.234568);
/// assert_eq!(round_to(2.5, 0), 3.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
