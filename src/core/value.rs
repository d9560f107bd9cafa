use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Geometry;
use crate::core::{PartCountError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Geometry(Geometry),
}

impl Value {
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(a.total_cmp(b)),
            (Value::Integer(a), Value::Float(b)) => Ok((*a as f64).total_cmp(b)),
            (Value::Float(a), Value::Integer(b)) => Ok(a.total_cmp(&(*b as f64))),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            _ => Err(PartCountError::TypeMismatch(format!(
                "Cannot compare incompatible types: {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::Geometry(_) => "GEOMETRY",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Geometry(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => write!(f, "{}", fl),
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Geometry(g) => write!(f, "<{} with {} part(s)>", g.shape_type(), g.part_count()),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Geometry> for Value {
    fn from(g: Geometry) -> Self {
        Self::Geometry(g)
    }
}

impl From<Option<Geometry>> for Value {
    fn from(g: Option<Geometry>) -> Self {
        g.map(Self::Geometry).unwrap_or(Self::Null)
    }
}

/// Attribute column types a feature class can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Oid,
    Geometry,
    Short,
    Long,
    Double,
    Text,
    Boolean,
}

impl FieldType {
    /// Fields the workspace manages itself; they cannot be added or deleted.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::Oid | Self::Geometry)
    }

    pub fn is_compatible(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Oid, Value::Integer(_)) => true,
            (Self::Geometry, Value::Geometry(_)) => true,
            (Self::Short, Value::Integer(i)) => i16::try_from(*i).is_ok(),
            (Self::Long, Value::Integer(i)) => i32::try_from(*i).is_ok(),
            (Self::Double, Value::Float(_) | Value::Integer(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::Boolean, Value::Boolean(_)) => true,
            _ => false,
        }
    }

    /// Coerce `value` into the storage representation of this type.
    pub fn cast_value(&self, value: &Value) -> Result<Value> {
        if !self.is_compatible(value) {
            return Err(PartCountError::TypeMismatch(format!(
                "{} value {} does not fit a {} field",
                value.type_name(),
                value,
                self
            )));
        }

        Ok(match (self, value) {
            (Self::Double, Value::Integer(i)) => Value::Float(*i as f64),
            _ => value.clone(),
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oid => write!(f, "OID"),
            Self::Geometry => write!(f, "GEOMETRY"),
            Self::Short => write!(f, "SHORT"),
            Self::Long => write!(f, "LONG"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

impl FromStr for FieldType {
    type Err = PartCountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHORT" => Ok(Self::Short),
            "LONG" => Ok(Self::Long),
            "DOUBLE" | "FLOAT" => Ok(Self::Double),
            "TEXT" | "STRING" => Ok(Self::Text),
            "BOOLEAN" => Ok(Self::Boolean),
            "OID" => Ok(Self::Oid),
            "GEOMETRY" => Ok(Self::Geometry),
            _ => Err(PartCountError::ParseError(format!("Unknown field type '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_compare() {
        assert_eq!(
            Value::Integer(1).compare(&Value::Integer(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::Integer(2).compare(&Value::Float(2.0)).unwrap(),
            Ordering::Equal
        );
        assert!(Value::Text("a".into()).compare(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_short_range() {
        assert!(FieldType::Short.is_compatible(&Value::Integer(32767)));
        assert!(!FieldType::Short.is_compatible(&Value::Integer(40000)));
        assert!(FieldType::Short.is_compatible(&Value::Null));
        assert!(FieldType::Short.cast_value(&Value::Integer(-40000)).is_err());
    }

    #[test]
    fn test_double_widens_integers() {
        assert_eq!(
            FieldType::Double.cast_value(&Value::Integer(3)).unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!("short".parse::<FieldType>().unwrap(), FieldType::Short);
        assert_eq!("String".parse::<FieldType>().unwrap(), FieldType::Text);
        assert!("BLOB".parse::<FieldType>().is_err());
    }
}
