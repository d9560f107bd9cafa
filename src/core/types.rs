use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FieldType, PartCountError, Result, ShapeType, Value};

pub type Row = Vec<Value>;

pub const MAX_FIELD_NAME_LEN: usize = 64;

lazy_static! {
    static ref FIELD_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Reject names a feature class column cannot carry.
pub fn validate_field_name(name: &str) -> Result<()> {
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(PartCountError::schema(format!(
            "Field name '{}' is longer than {} characters",
            name, MAX_FIELD_NAME_LEN
        )));
    }
    if !FIELD_NAME.is_match(name) {
        return Err(PartCountError::schema(format!(
            "Field name '{}' must start with a letter or underscore and contain only letters, digits and underscores",
            name
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            if !self.nullable {
                return Err(PartCountError::TypeMismatch(format!(
                    "Field '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(Value::Null);
        }

        self.field_type.cast_value(value).map_err(|_| {
            PartCountError::TypeMismatch(format!(
                "Field '{}' expects type {}, got {} {}",
                self.name,
                self.field_type,
                value.type_name(),
                value
            ))
        })
    }
}

/// Schema of one feature class: its name, geometry category and ordered
/// fields. The object-id field is always first and the shape field second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSchema {
    name: String,
    shape_type: ShapeType,
    fields: Vec<Field>,
}

impl ClassSchema {
    pub fn new(
        name: impl Into<String>,
        shape_type: ShapeType,
        oid_field_name: &str,
        shape_field_name: &str,
    ) -> Result<Self> {
        validate_field_name(oid_field_name)?;
        validate_field_name(shape_field_name)?;
        if oid_field_name.eq_ignore_ascii_case(shape_field_name) {
            return Err(PartCountError::schema(
                "Object id and shape fields must have different names",
            ));
        }

        Ok(Self {
            name: name.into(),
            shape_type,
            fields: vec![
                Field::new(oid_field_name, FieldType::Oid).not_null(),
                Field::new(shape_field_name, FieldType::Geometry),
            ],
        })
    }

    /// Schema with the conventional `OBJECTID` and `Shape` system fields.
    pub fn standard(name: impl Into<String>, shape_type: ShapeType) -> Self {
        Self {
            name: name.into(),
            shape_type,
            fields: vec![
                Field::new("OBJECTID", FieldType::Oid).not_null(),
                Field::new("Shape", FieldType::Geometry),
            ],
        }
    }

    pub fn with_field(mut self, field: Field) -> Result<Self> {
        self.push_field(field)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn oid_field_name(&self) -> &str {
        &self.fields[0].name
    }

    pub fn shape_field_name(&self) -> &str {
        &self.fields[1].name
    }

    pub fn oid_index(&self) -> usize {
        0
    }

    pub fn shape_index(&self) -> usize {
        1
    }

    /// Field names are matched case-insensitively.
    pub fn find_field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.find_field_index(name).map(|idx| &self.fields[idx])
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn push_field(&mut self, field: Field) -> Result<usize> {
        validate_field_name(&field.name)?;
        if field.field_type.is_system() {
            return Err(PartCountError::schema(format!(
                "Cannot add a second {} field '{}'",
                field.field_type, field.name
            )));
        }
        if self.find_field_index(&field.name).is_some() {
            return Err(PartCountError::schema(format!(
                "Field '{}' already exists in '{}'",
                field.name, self.name
            )));
        }
        self.fields.push(field);
        Ok(self.fields.len() - 1)
    }

    pub(crate) fn remove_field(&mut self, name: &str) -> Result<usize> {
        let idx = self.find_field_index(name).ok_or_else(|| {
            PartCountError::schema(format!("Field '{}' does not exist in '{}'", name, self.name))
        })?;
        if self.fields[idx].field_type.is_system() {
            return Err(PartCountError::schema(format!(
                "Field '{}' is required and cannot be deleted",
                self.fields[idx].name
            )));
        }
        self.fields.remove(idx);
        Ok(idx)
    }
}
