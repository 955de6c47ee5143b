//! Nearest-point lookup by great-circle distance
//!
//! [`ProximityIndex`] deliberately performs a linear scan. Milepost and
//! access point collections hold hundreds of features per load, where a
//! scan is faster to build and query than a spatial index. If collections
//! grow by orders of magnitude, a k-d tree or grid can replace the scan
//! behind the same interface.

use geojson::Feature;

use crate::{
    record::{Coordinate, PointRecord},
    util::geodesic::distance,
};

/// Something with an optional point position
pub trait Located {
    /// Returns the item's position or [`None`] if it has no usable point
    /// geometry
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Located for PointRecord {
    fn coordinate(&self) -> Option<Coordinate> {
        Some(self.coordinate)
    }
}

impl Located for Feature {
    fn coordinate(&self) -> Option<Coordinate> {
        match &self.geometry.as_ref()?.value {
            geojson::Value::Point(position) => Coordinate::from_position(position),
            _ => None,
        }
    }
}

impl<T: Located> Located for &T {
    fn coordinate(&self) -> Option<Coordinate> {
        (*self).coordinate()
    }
}

/// The result of a nearest-point query
#[derive(Debug, PartialEq)]
pub struct Nearest<'a, T> {
    /// The closest item
    pub item: &'a T,

    /// Its great-circle distance to the query in meters
    pub distance: f64,
}

/// Answers nearest-point queries over a borrowed collection
#[derive(Debug)]
pub struct ProximityIndex<'a, T> {
    items: &'a [T],
}

impl<'a, T: Located> ProximityIndex<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self { items }
    }

    /// Number of items with a usable position
    pub fn located_len(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.coordinate().is_some())
            .count()
    }

    /// Finds the item closest to `query`. Items without a position are
    /// ignored. If several items are equally close, the first one wins.
    /// Returns [`None`] if no item has a position.
    pub fn nearest(&self, query: Coordinate) -> Option<Nearest<'a, T>> {
        let items: &'a [T] = self.items;
        let mut best: Option<Nearest<'a, T>> = None;
        for item in items {
            let Some(c) = item.coordinate() else {
                continue;
            };
            let d = distance(query, c);
            if best.as_ref().map_or(true, |b| d < b.distance) {
                best = Some(Nearest { item, distance: d });
            }
        }
        best
    }
}

/// Shorthand for [`ProximityIndex::nearest`]
///
/// ```rust
/// use railref_core::{proximity::nearest, record::Coordinate};
///
/// let empty: Vec<railref_core::record::PointRecord> = Vec::new();
/// assert!(nearest(Coordinate::new(0.0, 0.0), &empty).is_none());
/// ```
pub fn nearest<T: Located>(query: Coordinate, items: &[T]) -> Option<Nearest<'_, T>> {
    ProximityIndex::new(items).nearest(query)
}
