//! Build a feature class from a JSON document.
//!
//! ```json
//! {
//!   "name": "parcels",
//!   "shape_type": "Polygon",
//!   "fields": [{ "name": "NAME", "type": "TEXT" }],
//!   "features": [
//!     { "geometry": { "parts": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
//!       "attributes": { "NAME": "lot 1" } },
//!     { "geometry": null, "attributes": {} }
//!   ]
//! }
//! ```

use super::table::FeatureClass;
use crate::core::{
    ClassSchema, Coord, Field, FieldType, Geometry, PartCountError, Result, ShapeType, Value,
};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct FeatureClassDocument {
    pub name: String,
    pub shape_type: ShapeType,
    #[serde(default = "default_oid_field")]
    pub oid_field: String,
    #[serde(default = "default_shape_field")]
    pub shape_field: String,
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
    #[serde(default)]
    pub features: Vec<FeatureDocument>,
}

#[derive(Debug, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize)]
pub struct FeatureDocument {
    #[serde(default)]
    pub geometry: Option<GeometryDocument>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct GeometryDocument {
    pub parts: Vec<Vec<Coord>>,
}

fn default_oid_field() -> String {
    "OBJECTID".to_string()
}

fn default_shape_field() -> String {
    "Shape".to_string()
}

impl FeatureClassDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_feature_class(self) -> Result<FeatureClass> {
        let mut schema =
            ClassSchema::new(&self.name, self.shape_type, &self.oid_field, &self.shape_field)?;
        for field in &self.fields {
            schema = schema.with_field(Field::new(&field.name, field.field_type))?;
        }

        let mut class = FeatureClass::new(schema);
        for feature in self.features {
            let geometry = feature
                .geometry
                .map(|g| Geometry::new(self.shape_type, g.parts));
            let attributes = feature
                .attributes
                .iter()
                .map(|(name, value)| Ok((name.as_str(), json_to_value(value)?)))
                .collect::<Result<Vec<_>>>()?;
            class.insert(geometry, &attributes)?;
        }
        Ok(class)
    }
}

fn json_to_value(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(PartCountError::TypeMismatch(format!("Unsupported number {}", n)))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        other => Err(PartCountError::TypeMismatch(format!(
            "Attribute values must be scalars, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_to_feature_class() {
        let json = r#"{
            "name": "lakes",
            "shape_type": "Polygon",
            "fields": [{ "name": "NAME", "type": "TEXT" }, { "name": "DEPTH", "type": "DOUBLE" }],
            "features": [
                { "geometry": { "parts": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
                  "attributes": { "NAME": "Mirror", "DEPTH": 12 } },
                { "geometry": { "parts": [[[0, 0], [1, 0], [0, 1], [0, 0]], [[5, 5], [6, 5], [5, 6], [5, 5]]] } },
                { "geometry": null }
            ]
        }"#;

        let class = FeatureClassDocument::from_json(json)
            .unwrap()
            .into_feature_class()
            .unwrap();

        assert_eq!(class.row_count(), 3);
        assert_eq!(
            class.schema().field_names(),
            vec!["OBJECTID", "Shape", "NAME", "DEPTH"]
        );
        let first = class.get(1).unwrap();
        assert_eq!(first[2], Value::Text("Mirror".into()));
        assert_eq!(first[3], Value::Float(12.0));

        let second = class.get(2).unwrap()[1].as_geometry().unwrap().clone();
        assert_eq!(second.part_count(), 2);
        assert!(class.get(3).unwrap()[1].is_null());
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let json = r#"{
            "name": "wells",
            "shape_type": "Point",
            "features": [{ "geometry": { "parts": [[[1, 2]]] }, "attributes": { "DEPTH": 3 } }]
        }"#;
        let result = FeatureClassDocument::from_json(json)
            .unwrap()
            .into_feature_class();
        assert!(matches!(result, Err(PartCountError::ColumnNotFound(_, _))));
    }
}
