use crate::util::geodesic::{round_to, METERS_PER_MILE};

/// Chainage values are stored in miles with this many decimal places
pub const CHAINAGE_DECIMALS: i32 = 6;

/// One route feature taking part in a recalculation
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    /// Index of the feature in its route collection
    pub feature: usize,

    /// The line identifier the segment is grouped by
    pub line: String,

    /// The start chainage found in the file
    pub stored_from: f64,

    /// The end chainage found in the file, if it was a finite number
    pub stored_to: Option<f64>,

    /// Geodesic length of the segment's geometry
    pub length_meters: f64,

    /// Computed start chainage in miles
    pub from: f64,

    /// Computed end chainage in miles
    pub to: f64,
}

impl RouteSegment {
    pub fn new(
        feature: usize,
        line: String,
        stored_from: f64,
        stored_to: Option<f64>,
        length_meters: f64,
    ) -> Self {
        Self {
            feature,
            line,
            stored_from,
            stored_to,
            length_meters,
            from: stored_from,
            to: stored_to.unwrap_or(stored_from),
        }
    }

    pub fn length_miles(&self) -> f64 {
        self.length_meters / METERS_PER_MILE
    }
}

/// All segments of one line, treated as one continuous chainage sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub line: String,
    pub segments: Vec<RouteSegment>,
}

impl LineGroup {
    pub fn new(line: String) -> Self {
        Self {
            line,
            segments: Vec::new(),
        }
    }

    /// Orders the segments by their stored start chainage and assigns
    /// contiguous ranges. The first segment keeps its stored start, every
    /// following segment starts where the previous one ends.
    ///
    /// Both ends are rounded from the unrounded cursor, so a stored start
    /// with more decimals than [`CHAINAGE_DECIMALS`] still contributes to
    /// the end of the first segment.
    ///
    /// Segments with equal stored starts are not simply kept in input
    /// order. They are ordered by their stored end first (a missing end
    /// sorts last) and only then by input order. After a first run several
    /// segments can share a start, e.g. a zero-length segment and its
    /// successor, and only their stored ends restore the order a second run
    /// needs to leave the group unchanged.
    pub fn assign_chainage(&mut self) {
        self.segments.sort_by(|a, b| {
            a.stored_from.total_cmp(&b.stored_from).then_with(|| {
                let a_to = a.stored_to.unwrap_or(f64::INFINITY);
                let b_to = b.stored_to.unwrap_or(f64::INFINITY);
                a_to.total_cmp(&b_to)
            })
        });

        let mut cursor = self
            .segments
            .first()
            .map(|s| s.stored_from)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);

        for (i, segment) in self.segments.iter_mut().enumerate() {
            if i == 0 && segment.stored_from.is_finite() {
                cursor = segment.stored_from;
            }
            segment.from = round_to(cursor, CHAINAGE_DECIMALS);
            segment.to = round_to(cursor + segment.length_miles(), CHAINAGE_DECIMALS);
            cursor = segment.to;
        }
    }

    /// Checks that every segment starts where its predecessor ends
    pub fn is_contiguous(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].to == w[1].from)
    }

    /// The chainage range covered by the whole group
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.segments.first()?.from, self.segments.last()?.to))
    }
}
