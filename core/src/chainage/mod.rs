//! Chainage recalculation for route geometries
//!
//! Every route feature carries a start and end chainage in miles. After
//! geometry edits these ranges drift apart from the actual geometry. The
//! [`ChainageEngine`] groups features by line identifier, orders each group
//! by its stored start chainage and derives new contiguous ranges from the
//! geodesic length of each geometry.

use std::{collections::BTreeMap, path::Path};

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::{config::ChainageConfig, error::Result, util::geodesic::geometry_length};

pub use self::collection::RouteCollection;
pub use self::segment::{LineGroup, RouteSegment, CHAINAGE_DECIMALS};

pub mod collection;
pub mod segment;

/// Group key for features without a usable line identifier
pub const UNKNOWN_LINE: &str = "UNKNOWN";

/// Summary of a recalculation run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Recalculation {
    /// Number of features that received new chainage values
    pub updated: usize,

    /// Number of features left untouched because their start chainage was
    /// missing or unusable
    pub excluded: usize,

    /// Number of line groups
    pub lines: usize,
}

/// Reads a stored chainage value. Numbers and numeric strings are accepted
/// if they are finite. Everything else (missing, `null`, booleans, text)
/// yields [`None`].
fn stored_chainage(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Reads a stored start chainage. A present but empty start (`null` or a
/// blank string) counts as 0. A missing property or an unusable value
/// yields [`None`] and excludes the feature.
fn stored_start(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Null => Some(0.0),
        JsonValue::String(s) if s.trim().is_empty() => Some(0.0),
        value => stored_chainage(Some(value)),
    }
}

/// Reads a line identifier. Missing, `null` and empty identifiers map to
/// [`UNKNOWN_LINE`].
fn line_identifier(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => UNKNOWN_LINE.to_string(),
    }
}

/// Recalculates the chainage ranges of route features
#[derive(Debug, Clone, Default)]
pub struct ChainageEngine {
    config: ChainageConfig,
}

impl ChainageEngine {
    pub fn new(config: ChainageConfig) -> Self {
        Self { config }
    }

    /// Extracts the segments that take part in a recalculation, grouped by
    /// line identifier. Also returns the number of excluded features.
    pub fn line_groups(&self, collection: &RouteCollection) -> (BTreeMap<String, LineGroup>, usize) {
        let mut groups: BTreeMap<String, LineGroup> = BTreeMap::new();
        let mut excluded = 0;

        for (i, feature) in collection.features().iter().enumerate() {
            let properties = feature.get("properties");
            let property = |key: &str| properties.and_then(|p| p.get(key));

            let Some(stored_from) = stored_start(property(&self.config.from_property)) else {
                debug!(feature = i, "excluding feature without start chainage");
                excluded += 1;
                continue;
            };
            let stored_to = stored_chainage(property(&self.config.to_property));
            let line = line_identifier(property(&self.config.line_property));

            let geometry = feature.get("geometry").unwrap_or(&JsonValue::Null);
            let length_meters = geometry_length(geometry);
            if length_meters == 0.0 {
                warn!(feature = i, line = %line, "segment has no measurable geometry");
            }

            groups
                .entry(line.clone())
                .or_insert_with(|| LineGroup::new(line.clone()))
                .segments
                .push(RouteSegment::new(
                    i,
                    line,
                    stored_from,
                    stored_to,
                    length_meters,
                ));
        }

        (groups, excluded)
    }

    /// Recalculates all chainage ranges in place and returns a summary
    pub fn recalculate(&self, collection: &mut RouteCollection) -> Recalculation {
        let (mut groups, excluded) = self.line_groups(collection);
        let mut result = Recalculation {
            excluded,
            lines: groups.len(),
            ..Default::default()
        };

        let features = collection.features_mut();
        for group in groups.values_mut() {
            group.assign_chainage();
            if let Some((from, to)) = group.range() {
                debug!(
                    line = %group.line,
                    segments = group.segments.len(),
                    from,
                    to,
                    "assigned chainage"
                );
            }

            for segment in &group.segments {
                let properties = features
                    .get_mut(segment.feature)
                    .and_then(|f| f.get_mut("properties"))
                    .and_then(JsonValue::as_object_mut);
                if let Some(properties) = properties {
                    properties.insert(
                        self.config.from_property.clone(),
                        JsonValue::from(segment.from),
                    );
                    properties.insert(self.config.to_property.clone(), JsonValue::from(segment.to));
                    result.updated += 1;
                }
            }
        }

        result
    }
}

/// Recalculates the chainage of a route geometry file and rewrites it in
/// place. Nothing is written if the file cannot be read or parsed.
pub fn recalculate_file(path: impl AsRef<Path>, config: ChainageConfig) -> Result<Recalculation> {
    let path = path.as_ref();
    let mut collection = RouteCollection::read(path)?;
    let result = ChainageEngine::new(config).recalculate(&mut collection);
    collection.write(path)?;

    info!(
        path = %path.display(),
        updated = result.updated,
        excluded = result.excluded,
        lines = result.lines,
        "recalculated chainage"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use assertor::{assert_that, EqualityAssertion};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value as JsonValue};
    use tempdir::TempDir;

    use super::{
        line_identifier, recalculate_file, stored_chainage, stored_start, ChainageEngine,
        Recalculation, RouteCollection, UNKNOWN_LINE,
    };
    use crate::{
        config::ChainageConfig,
        util::geodesic::{distance, METERS_PER_MILE},
        Error,
    };
    use crate::record::Coordinate;

    /// A meridian segment of roughly `miles` miles starting at `lat`
    fn meridian(lat: f64, miles: f64) -> JsonValue {
        let degrees = (miles * METERS_PER_MILE / crate::util::geodesic::EARTH_RADIUS_METERS)
            .to_degrees();
        json!({
            "type": "LineString",
            "coordinates": [[-2.2, lat], [-2.2, lat + degrees]]
        })
    }

    fn feature(line: JsonValue, from: JsonValue, geometry: JsonValue) -> JsonValue {
        json!({
            "type": "Feature",
            "properties": { "ELR": line, "L_M_FROM": from, "L_M_TO": null },
            "geometry": geometry
        })
    }

    fn collection(features: Vec<JsonValue>) -> RouteCollection {
        RouteCollection::new(json!({ "type": "FeatureCollection", "features": features })).unwrap()
    }

    fn chainage(collection: &RouteCollection) -> Vec<(JsonValue, JsonValue)> {
        collection
            .features()
            .iter()
            .map(|f| {
                (
                    f["properties"]["L_M_FROM"].clone(),
                    f["properties"]["L_M_TO"].clone(),
                )
            })
            .collect()
    }

    #[test]
    fn stored_values() {
        assert_eq!(stored_chainage(Some(&json!(1.5))), Some(1.5));
        assert_eq!(stored_chainage(Some(&json!(0))), Some(0.0));
        assert_eq!(stored_chainage(Some(&json!(" 12.25 "))), Some(12.25));
        assert_eq!(stored_chainage(Some(&json!(""))), None);
        assert_eq!(stored_chainage(Some(&json!("12m"))), None);
        assert_eq!(stored_chainage(Some(&json!("NaN"))), None);
        assert_eq!(stored_chainage(Some(&json!(null))), None);
        assert_eq!(stored_chainage(Some(&json!(true))), None);
        assert_eq!(stored_chainage(None), None);
    }

    #[test]
    fn stored_starts() {
        assert_eq!(stored_start(Some(&json!(null))), Some(0.0));
        assert_eq!(stored_start(Some(&json!(""))), Some(0.0));
        assert_eq!(stored_start(Some(&json!("  "))), Some(0.0));
        assert_eq!(stored_start(Some(&json!("7.5"))), Some(7.5));
        assert_eq!(stored_start(Some(&json!(3))), Some(3.0));
        assert_eq!(stored_start(Some(&json!("12m"))), None);
        assert_eq!(stored_start(Some(&json!(false))), None);
        assert_eq!(stored_start(None), None);
    }

    #[test]
    fn identifiers() {
        assert_eq!(line_identifier(Some(&json!("ABC1"))), "ABC1");
        assert_eq!(line_identifier(Some(&json!(42))), "42");
        assert_eq!(line_identifier(Some(&json!("  "))), UNKNOWN_LINE);
        assert_eq!(line_identifier(Some(&json!(null))), UNKNOWN_LINE);
        assert_eq!(line_identifier(None), UNKNOWN_LINE);
    }

    #[test]
    fn contiguous_lines() {
        let mut c = collection(vec![
            feature(json!("ABC"), json!(20.0), meridian(53.2, 0.5)),
            feature(json!("XYZ"), json!(3.0), meridian(52.0, 2.0)),
            feature(json!("ABC"), json!(10.0), meridian(53.0, 1.0)),
            feature(json!("ABC"), json!(15.0), meridian(53.1, 0.25)),
        ]);

        let result = ChainageEngine::default().recalculate(&mut c);
        assert_that!(result).is_equal_to(Recalculation {
            updated: 4,
            excluded: 0,
            lines: 2,
        });

        assert_eq!(
            chainage(&c),
            vec![
                (json!(11.25), json!(11.75)),
                (json!(3.0), json!(5.0)),
                (json!(10.0), json!(11.0)),
                (json!(11.0), json!(11.25)),
            ]
        );
    }

    #[test]
    fn features_without_start_are_untouched() {
        let missing = json!({
            "type": "Feature",
            "properties": { "ELR": "ABC", "L_M_TO": 99 },
            "geometry": meridian(53.0, 1.0)
        });
        let text = json!({
            "type": "Feature",
            "properties": { "ELR": "ABC", "L_M_FROM": "12m 40ch", "L_M_TO": 13 },
            "geometry": meridian(53.0, 1.0)
        });
        let no_properties = json!({ "type": "Feature", "geometry": meridian(53.0, 1.0) });
        let mut c = collection(vec![
            missing.clone(),
            feature(json!("ABC"), json!("2.5"), meridian(53.0, 1.0)),
            text.clone(),
            no_properties.clone(),
        ]);

        let result = ChainageEngine::default().recalculate(&mut c);
        assert_eq!(result.updated, 1);
        assert_eq!(result.excluded, 3);
        assert_eq!(c.features()[0], missing);
        assert_eq!(c.features()[2], text);
        assert_eq!(c.features()[3], no_properties);
        assert_eq!(c.features()[1]["properties"]["L_M_FROM"], json!(2.5));
        assert_eq!(c.features()[1]["properties"]["L_M_TO"], json!(3.5));
    }

    #[test]
    fn empty_starts_count_as_zero() {
        let mut c = collection(vec![feature(json!("ABC"), json!(null), meridian(53.0, 1.0))]);
        let result = ChainageEngine::default().recalculate(&mut c);
        assert_eq!(result.updated, 1);
        assert_eq!(result.excluded, 0);
        assert_eq!(chainage(&c), vec![(json!(0.0), json!(1.0))]);

        let mut c = collection(vec![feature(json!("ABC"), json!(" "), meridian(53.0, 2.0))]);
        ChainageEngine::default().recalculate(&mut c);
        assert_eq!(chainage(&c), vec![(json!(0.0), json!(2.0))]);
    }

    #[test]
    fn end_includes_unrounded_start() {
        let mut c = collection(vec![feature(
            json!("ABC"),
            json!(0.0000004),
            meridian(53.0, 0.0000002),
        )]);
        ChainageEngine::default().recalculate(&mut c);
        assert_eq!(chainage(&c), vec![(json!(0.0), json!(0.000001))]);
    }

    #[test]
    fn unknown_line_group() {
        let mut c = collection(vec![
            feature(json!(null), json!(0.0), meridian(53.0, 1.0)),
            feature(json!(""), json!(4.0), meridian(53.0, 1.0)),
        ]);
        let engine = ChainageEngine::default();

        let (groups, _) = engine.line_groups(&c);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec![UNKNOWN_LINE]);

        engine.recalculate(&mut c);
        assert_eq!(
            chainage(&c),
            vec![(json!(0.0), json!(1.0)), (json!(1.0), json!(2.0))]
        );
    }

    #[test]
    fn degraded_geometries() {
        let mut c = collection(vec![
            feature(json!("ABC"), json!(1.0), json!(null)),
            feature(
                json!("ABC"),
                json!(2.0),
                json!({ "type": "Point", "coordinates": [-2.2, 53.0] }),
            ),
            feature(
                json!("ABC"),
                json!(3.0),
                json!({ "type": "LineString", "coordinates": "garbage" }),
            ),
        ]);

        let result = ChainageEngine::default().recalculate(&mut c);
        assert_eq!(result.updated, 3);
        assert_eq!(
            chainage(&c),
            vec![
                (json!(1.0), json!(1.0)),
                (json!(1.0), json!(1.0)),
                (json!(1.0), json!(1.0)),
            ]
        );
    }

    #[test]
    fn multi_line_strings() {
        let a = Coordinate::new(-2.2, 53.0);
        let b = Coordinate::new(-2.2, 53.01);
        let c2 = Coordinate::new(-2.3, 53.0);
        let d = Coordinate::new(-2.3, 53.02);
        let expected = (distance(a, b) + distance(c2, d)) / METERS_PER_MILE;

        let mut c = collection(vec![feature(
            json!("ABC"),
            json!(0),
            json!({
                "type": "MultiLineString",
                "coordinates": [
                    [a.to_position(), b.to_position()],
                    [c2.to_position(), d.to_position()]
                ]
            }),
        )]);
        ChainageEngine::default().recalculate(&mut c);

        let to = c.features()[0]["properties"]["L_M_TO"].as_f64().unwrap();
        assert!((to - expected).abs() <= 5e-7);
    }

    #[test]
    fn idempotence() {
        let mut c = collection(vec![
            feature(json!("ABC"), json!(7.123456789), meridian(53.2, 0.3333)),
            feature(json!("ABC"), json!(1.0), meridian(53.0, 0.0)),
            feature(json!("ABC"), json!(7.5), meridian(53.1, 1.77)),
            feature(json!("DEF"), json!(0.0), meridian(52.1, 0.0)),
            feature(json!("DEF"), json!(0.0), meridian(52.0, 2.5)),
        ]);
        let engine = ChainageEngine::default();

        engine.recalculate(&mut c);
        let first = c.clone();
        engine.recalculate(&mut c);
        assert_eq!(c, first);

        for group in engine.line_groups(&c).0.values_mut() {
            group.assign_chainage();
            assert!(group.is_contiguous());
        }
    }

    #[test]
    fn start_is_preserved() {
        let mut c = collection(vec![
            feature(json!("ABC"), json!(42.0000004), meridian(53.0, 1.0)),
            feature(json!("ABC"), json!(50.0), meridian(53.1, 1.0)),
        ]);
        ChainageEngine::default().recalculate(&mut c);
        assert_eq!(
            chainage(&c),
            vec![(json!(42.0), json!(43.0)), (json!(43.0), json!(44.0))]
        );
    }

    #[test]
    fn custom_property_names() {
        let config = ChainageConfig {
            line_property: "LINE".to_string(),
            from_property: "START".to_string(),
            to_property: "END".to_string(),
        };
        let mut c = collection(vec![json!({
            "type": "Feature",
            "properties": { "LINE": "ABC", "START": 5 },
            "geometry": meridian(53.0, 2.0)
        })]);
        ChainageEngine::new(config).recalculate(&mut c);
        assert_eq!(c.features()[0]["properties"]["START"], json!(5.0));
        assert_eq!(c.features()[0]["properties"]["END"], json!(7.0));
        assert!(c.features()[0]["properties"].get("L_M_TO").is_none());
    }

    #[test]
    fn rewrite_file() {
        let dir = TempDir::new("railref_chainage").unwrap();
        let path = dir.path().join("Rail_reference_line.geojson");
        let document = json!({
            "type": "FeatureCollection",
            "name": "Rail_reference_line",
            "features": [
                feature(json!("ABC"), json!(10.0), meridian(53.0, 1.0)),
                feature(json!("ABC"), json!(11.5), meridian(53.1, 1.0)),
            ]
        });
        fs::write(&path, document.to_string()).unwrap();

        let result = recalculate_file(&path, ChainageConfig::default()).unwrap();
        assert_eq!(result.updated, 2);

        let written: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["name"], json!("Rail_reference_line"));
        assert_eq!(written["features"][1]["properties"]["L_M_FROM"], json!(11.0));
        assert_eq!(written["features"][1]["properties"]["L_M_TO"], json!(12.0));
    }

    #[test]
    fn unreadable_file_is_not_written() {
        let dir = TempDir::new("railref_chainage").unwrap();
        let path = dir.path().join("routes.geojson");
        fs::write(&path, "{ \"type\": \"FeatureCollection\", ").unwrap();

        let err = recalculate_file(&path, ChainageConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{ \"type\": \"FeatureCollection\", "
        );

        let missing = dir.path().join("missing.geojson");
        let err = recalculate_file(&missing, ChainageConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Read { path: p, .. } if p == missing));
        assert!(!missing.exists());
    }
}
