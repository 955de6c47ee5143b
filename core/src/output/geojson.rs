use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::Value as JsonValue;

use crate::{
    config::IngestConfig,
    record::PointRecord,
    util::bounding_box::{bounding_box, to_geojson_bbox},
};

/// Placeholder for text attributes that are absent from the source row
pub const NOT_AVAILABLE: &str = "N/A";

pub const MILEAGE_PROPERTY: &str = "mileage";
pub const NAME_PROPERTY: &str = "name";
pub const KIND_PROPERTY: &str = "type";

fn text_or_placeholder(value: Option<&str>) -> JsonValue {
    JsonValue::String(value.unwrap_or(NOT_AVAILABLE).to_string())
}

/// Converts point records into GeoJSON point features.
///
/// Only the properties whose roles are mapped are emitted. A missing
/// mileage becomes `null`, every other missing attribute becomes `"N/A"`.
#[derive(Debug, Clone)]
pub struct FeatureWriter<'a> {
    line_property: &'a str,
    with_mileage: bool,
    with_name: bool,
    with_kind: bool,
}

impl<'a> FeatureWriter<'a> {
    /// Creates a writer that only emits the line identifier (and the
    /// passthrough attributes of each record)
    pub fn new(line_property: &'a str) -> Self {
        Self {
            line_property,
            with_mileage: false,
            with_name: false,
            with_kind: false,
        }
    }

    /// Creates a writer that emits exactly the roles mapped in `config`
    pub fn from_config(config: &'a IngestConfig) -> Self {
        Self::new(&config.line_property)
            .with_mileage(config.columns.mileage_column().is_some())
            .with_name(config.columns.name_column().is_some())
            .with_kind(config.columns.kind_column().is_some())
    }

    pub fn with_mileage(mut self, enabled: bool) -> Self {
        self.with_mileage = enabled;
        self
    }

    pub fn with_name(mut self, enabled: bool) -> Self {
        self.with_name = enabled;
        self
    }

    pub fn with_kind(mut self, enabled: bool) -> Self {
        self.with_kind = enabled;
        self
    }

    /// Converts a single record. The geometry is a point `[lon, lat]`.
    pub fn feature(&self, record: &PointRecord) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert(
            self.line_property.to_string(),
            JsonValue::String(record.line.clone()),
        );
        if self.with_mileage {
            let mileage = record
                .mileage
                .clone()
                .map(JsonValue::from)
                .unwrap_or(JsonValue::Null);
            properties.insert(MILEAGE_PROPERTY.to_string(), mileage);
        }
        if self.with_name {
            properties.insert(
                NAME_PROPERTY.to_string(),
                text_or_placeholder(record.name.as_deref()),
            );
        }
        if self.with_kind {
            properties.insert(
                KIND_PROPERTY.to_string(),
                text_or_placeholder(record.kind.as_deref()),
            );
        }
        for (name, value) in &record.attributes {
            properties.insert(name.clone(), text_or_placeholder(value.as_deref()));
        }

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::Point(
                record.coordinate.to_position(),
            ))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Converts all records into a feature collection. The collection's
    /// `bbox` covers all points and is omitted if there are none.
    pub fn collection(&self, records: &[PointRecord]) -> FeatureCollection {
        FeatureCollection {
            bbox: bounding_box(records.iter().map(|r| r.coordinate))
                .map(|bb| to_geojson_bbox(&bb)),
            features: records.iter().map(|r| self.feature(r)).collect(),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value as JsonValue};

    use super::FeatureWriter;
    use crate::{
        config::{ColumnMapping, IngestConfig},
        input::csv::ingest,
        record::{Coordinate, PointRecord, Value},
    };

    fn record() -> PointRecord {
        PointRecord {
            line: "ELR1".to_string(),
            mileage: Some(Value::Number(12.5)),
            name: None,
            kind: Some("milepost".to_string()),
            attributes: vec![("access".to_string(), None)],
            coordinate: Coordinate::new(-2.2, 53.1),
        }
    }

    #[test]
    fn csv_row_to_feature() {
        let config = IngestConfig::default();
        let ingested = ingest("elr,mileage,lat,lon\nELR1,12.5,53.1,-2.2\n", &config).unwrap();
        let feature = FeatureWriter::from_config(&config).feature(&ingested.records[0]);

        assert_eq!(
            serde_json::to_value(&feature).unwrap(),
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-2.2, 53.1] },
                "properties": { "ELR": "ELR1", "mileage": 12.5 }
            })
        );
    }

    #[test]
    fn placeholders() {
        let writer = FeatureWriter::new("ELR")
            .with_mileage(true)
            .with_name(true)
            .with_kind(true);
        let mut r = record();
        r.mileage = None;
        let feature = writer.feature(&r);

        assert_eq!(
            JsonValue::Object(feature.properties.unwrap()),
            json!({
                "ELR": "ELR1",
                "mileage": null,
                "name": "N/A",
                "type": "milepost",
                "access": "N/A"
            })
        );
    }

    #[test]
    fn writer_follows_mapping() {
        let config = IngestConfig {
            line_property: "LINE".to_string(),
            columns: ColumnMapping {
                mileage: Some("mileage".to_string()),
                name: Some("name".to_string()),
                ..ColumnMapping::default()
            },
            ..IngestConfig::default()
        };
        let mut r = record();
        r.mileage = Some(Value::Text("12m 40ch".to_string()));

        let properties = FeatureWriter::from_config(&config)
            .feature(&r)
            .properties
            .unwrap();
        assert_eq!(properties["LINE"], json!("ELR1"));
        assert_eq!(properties["mileage"], json!("12m 40ch"));
        assert_eq!(properties["name"], json!("N/A"));
        assert!(!properties.contains_key("type"));
    }

    #[test]
    fn unmapped_mileage_is_omitted() {
        let config = IngestConfig {
            columns: ColumnMapping {
                mileage: Some(String::new()),
                ..ColumnMapping::default()
            },
            ..IngestConfig::default()
        };
        let properties = FeatureWriter::from_config(&config)
            .feature(&record())
            .properties
            .unwrap();
        assert_eq!(JsonValue::Object(properties), json!({ "ELR": "ELR1", "access": "N/A" }));
    }

    #[test]
    fn collection_with_bbox() {
        let mut other = record();
        other.coordinate = Coordinate::new(-2.6, 53.4);
        let collection = FeatureWriter::new("ELR").collection(&[record(), other]);

        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.bbox, Some(vec![-2.6, 53.1, -2.2, 53.4]));
    }

    #[test]
    fn empty_collection() {
        let collection = FeatureWriter::new("ELR").collection(&[]);
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({ "type": "FeatureCollection", "features": [] })
        );
    }
}
