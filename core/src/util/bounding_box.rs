use geo::{coord, Rect};

use crate::record::Coordinate;

/// Trait to grow a rectangle until it covers a coordinate
pub trait ExtendRect {
    /// Extends the rectangle so it overlaps the given coordinate
    fn extend_coordinate(&mut self, c: Coordinate);
}

impl ExtendRect for Rect {
    fn extend_coordinate(&mut self, c: Coordinate) {
        let min = self.min();
        self.set_min((min.x.min(c.lon), min.y.min(c.lat)));
        let max = self.max();
        self.set_max((max.x.max(c.lon), max.y.max(c.lat)));
    }
}

/// Computes the bounding box of all given coordinates or [`None`] if there
/// are none
///
/// # Examples
///
/// ```rust
/// use railref_core::{record::Coordinate, util::bounding_box::bounding_box};
///
/// let bb = bounding_box([
///     Coordinate::new(-2.2, 53.1),
///     Coordinate::new(-2.6, 53.4),
///     Coordinate::new(-2.4, 52.9),
/// ])
/// .unwrap();
/// assert_eq!(bb.min().x, -2.6);
/// assert_eq!(bb.min().y, 52.9);
/// assert_eq!(bb.max().x, -2.2);
/// assert_eq!(bb.max().y, 53.4);
///
/// assert!(bounding_box(Vec::new()).is_none());
/// ```
pub fn bounding_box(coords: impl IntoIterator<Item = Coordinate>) -> Option<Rect> {
    let mut coords = coords.into_iter();
    let first = coords.next()?;
    let mut bb = Rect::new(
        coord! { x: first.lon, y: first.lat },
        coord! { x: first.lon, y: first.lat },
    );
    for c in coords {
        bb.extend_coordinate(c);
    }
    Some(bb)
}

/// Converts a rectangle into a GeoJSON `bbox` member
/// (`[west, south, east, north]`)
pub fn to_geojson_bbox(bb: &Rect) -> Vec<f64> {
    vec![bb.min().x, bb.min().y, bb.max().x, bb.max().y]
}
