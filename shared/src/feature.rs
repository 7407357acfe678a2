use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CollectionKind, DatasetError};

/// Session-stable feature id, assigned by enumeration order.
pub type FeatureId = u64;

/// Geographic coordinate as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// GeoJSON `Feature`. Geometry is opaque and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Structural id, if it is a non-negative integer.
    pub fn numeric_id(&self) -> Option<FeatureId> {
        self.id.as_ref().and_then(Value::as_u64)
    }

    /// `properties.color`, once annotated.
    pub fn color(&self) -> Option<&str> {
        self.properties.get("color").and_then(Value::as_str)
    }

    /// Coordinate of a `Point` geometry.
    pub fn point_coordinates(&self) -> Option<LngLat> {
        if self.geometry.get("type").and_then(Value::as_str) != Some("Point") {
            return None;
        }
        let coords = self.geometry.get("coordinates")?.as_array()?;
        let lng = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some(LngLat::new(lng, lat))
    }
}

/// GeoJSON `FeatureCollection`. Foreign members (e.g. `crs`, `bbox`) ride along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub foreign: Map<String, Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
            foreign: Map::new(),
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, DatasetError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| DatasetError::Parse(e.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, DatasetError> {
        if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(DatasetError::NotAFeatureCollection);
        }
        serde_json::from_value(value).map_err(|e| DatasetError::Parse(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Fails on the first feature without a string `name`.
    pub fn require_names(&self, collection: CollectionKind) -> Result<(), DatasetError> {
        match self.features.iter().position(|f| f.name().is_none()) {
            Some(index) => Err(DatasetError::MissingName { collection, index }),
            None => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fixtures::{contour, point};
    use super::{FeatureCollection, LngLat};
    use crate::error::{CollectionKind, DatasetError};

    #[test]
    fn parses_feature_collection_and_keeps_foreign_members() {
        let payload = r#"{
            "type": "FeatureCollection",
            "name": "outlets",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [103.8, 1.3] },
                    "properties": { "name": "Bishan", "brand": "x" }
                }
            ]
        }"#;

        let fc = FeatureCollection::from_json_str(payload).expect("parse");
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.foreign.get("name"), Some(&json!("outlets")));
        assert_eq!(fc.features[0].name(), Some("Bishan"));
        assert_eq!(
            fc.features[0].point_coordinates(),
            Some(LngLat::new(103.8, 1.3))
        );
        let back = serde_json::to_value(&fc).expect("serialize");
        assert_eq!(back["name"], json!("outlets"));
    }

    #[test]
    fn rejects_non_collections() {
        let err = FeatureCollection::from_json_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert_eq!(err, DatasetError::NotAFeatureCollection);

        let err = FeatureCollection::from_json_str("not json").unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn polygons_have_no_point_coordinates() {
        assert_eq!(contour("A").point_coordinates(), None);
        assert_eq!(
            point("A", 1.0, 2.0).point_coordinates(),
            Some(LngLat::new(1.0, 2.0))
        );
    }

    #[test]
    fn require_names_reports_first_unnamed_feature() {
        let mut unnamed = contour("B");
        unnamed.properties.remove("name");
        let fc = FeatureCollection::new(vec![contour("A"), unnamed]);

        assert_eq!(
            fc.require_names(CollectionKind::Contours),
            Err(DatasetError::MissingName {
                collection: CollectionKind::Contours,
                index: 1,
            })
        );
    }
}
