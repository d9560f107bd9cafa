use crate::core::{ClassSchema, Field, Geometry, PartCountError, Result, Row, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Rows of one feature class keyed by object id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClass {
    schema: ClassSchema,
    rows: BTreeMap<i64, Row>,
    next_oid: i64,
}

impl FeatureClass {
    pub fn new(schema: ClassSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            next_oid: 1,
        }
    }

    pub fn schema(&self) -> &ClassSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Append a feature and return the object id assigned to it.
    pub fn insert(&mut self, shape: Option<Geometry>, attributes: &[(&str, Value)]) -> Result<i64> {
        if let Some(geometry) = &shape {
            if geometry.shape_type() != self.schema.shape_type() {
                return Err(PartCountError::TypeMismatch(format!(
                    "Cannot store a {} geometry in {} feature class '{}'",
                    geometry.shape_type(),
                    self.schema.shape_type(),
                    self.schema.name()
                )));
            }
        }

        let oid = self.next_oid;
        let mut row: Row = vec![Value::Null; self.schema.field_count()];
        row[self.schema.oid_index()] = Value::Integer(oid);
        row[self.schema.shape_index()] = Value::from(shape);

        for (name, value) in attributes {
            let idx = self.attribute_index(name)?;
            row[idx] = self.schema.fields()[idx].validate(value)?;
        }

        self.rows.insert(oid, row);
        self.next_oid += 1;
        Ok(oid)
    }

    pub fn get(&self, oid: i64) -> Option<&Row> {
        self.rows.get(&oid)
    }

    pub fn rows(&self) -> btree_map::Iter<'_, i64, Row> {
        self.rows.iter()
    }

    pub fn oids(&self) -> Vec<i64> {
        self.rows.keys().copied().collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Add a nullable column; existing rows get NULL.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        if !field.nullable {
            return Err(PartCountError::schema(format!(
                "Field '{}' must be nullable to be added to a populated feature class",
                field.name
            )));
        }
        self.schema.push_field(field)?;
        for row in self.rows.values_mut() {
            row.push(Value::Null);
        }
        Ok(())
    }

    pub fn delete_field(&mut self, name: &str) -> Result<()> {
        let idx = self.schema.remove_field(name)?;
        for row in self.rows.values_mut() {
            row.remove(idx);
        }
        Ok(())
    }

    /// Overwrite one column of an existing row.
    pub fn set_value(&mut self, oid: i64, column: usize, value: &Value) -> Result<()> {
        let field = self.schema.fields().get(column).ok_or_else(|| {
            PartCountError::execution(format!(
                "Column index {} out of range for '{}'",
                column,
                self.schema.name()
            ))
        })?;

        let row = self.rows.get_mut(&oid).ok_or_else(|| {
            PartCountError::execution(format!(
                "Row {} no longer exists in '{}'",
                oid,
                self.schema.name()
            ))
        })?;

        if column == self.schema.oid_index() {
            if value != &row[column] {
                return Err(PartCountError::execution(format!(
                    "Object id field '{}' is read-only",
                    field.name
                )));
            }
            return Ok(());
        }

        if let Value::Geometry(geometry) = value {
            if geometry.shape_type() != self.schema.shape_type() {
                return Err(PartCountError::TypeMismatch(format!(
                    "Cannot store a {} geometry in {} feature class '{}'",
                    geometry.shape_type(),
                    self.schema.shape_type(),
                    self.schema.name()
                )));
            }
        }

        row[column] = field.validate(value)?;
        Ok(())
    }

    fn attribute_index(&self, name: &str) -> Result<usize> {
        let idx = self.schema.find_field_index(name).ok_or_else(|| {
            PartCountError::ColumnNotFound(name.to_string(), self.schema.name().to_string())
        })?;
        if self.schema.fields()[idx].field_type.is_system() {
            return Err(PartCountError::execution(format!(
                "Field '{}' is managed by the feature class",
                name
            )));
        }
        Ok(idx)
    }
}
