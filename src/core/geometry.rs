use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{PartCountError, Result};

/// Geometry category of a feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Point,
    Multipoint,
    Polyline,
    Polygon,
    MultiPatch,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Multipoint => "Multipoint",
            Self::Polyline => "Polyline",
            Self::Polygon => "Polygon",
            Self::MultiPatch => "MultiPatch",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeType {
    type Err = PartCountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "multipoint" => Ok(Self::Multipoint),
            "polyline" => Ok(Self::Polyline),
            "polygon" => Ok(Self::Polygon),
            "multipatch" => Ok(Self::MultiPatch),
            _ => Err(PartCountError::ParseError(format!("Unknown shape type '{}'", s))),
        }
    }
}

/// A single vertex, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord(pub f64, pub f64);

/// Geometry value as stored by the workspace.
///
/// Parts are kept as they were written; the part count and the multipart
/// flag are read straight off the stored parts, nothing is decomposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    shape_type: ShapeType,
    parts: Vec<Vec<Coord>>,
}

impl Geometry {
    pub fn new(shape_type: ShapeType, parts: Vec<Vec<Coord>>) -> Self {
        Self { shape_type, parts }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(ShapeType::Point, vec![vec![Coord(x, y)]])
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn parts(&self) -> &[Vec<Coord>] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn is_multipart(&self) -> bool {
        self.part_count() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> Vec<Coord> {
        vec![
            Coord(offset, 0.0),
            Coord(offset + 1.0, 0.0),
            Coord(offset + 1.0, 1.0),
            Coord(offset, 0.0),
        ]
    }

    #[test]
    fn test_single_part_is_not_multipart() {
        let polygon = Geometry::new(ShapeType::Polygon, vec![square(0.0)]);
        assert_eq!(polygon.part_count(), 1);
        assert!(!polygon.is_multipart());
    }

    #[test]
    fn test_island_group_is_multipart() {
        let islands = Geometry::new(
            ShapeType::Polygon,
            vec![square(0.0), square(5.0), square(10.0)],
        );
        assert_eq!(islands.part_count(), 3);
        assert!(islands.is_multipart());
    }

    #[test]
    fn test_empty_geometry() {
        let empty = Geometry::new(ShapeType::Polyline, Vec::new());
        assert_eq!(empty.part_count(), 0);
        assert!(!empty.is_multipart());
    }

    #[test]
    fn test_shape_type_parse() {
        assert_eq!("polygon".parse::<ShapeType>().unwrap(), ShapeType::Polygon);
        assert_eq!("MultiPatch".parse::<ShapeType>().unwrap(), ShapeType::MultiPatch);
        assert!("surface".parse::<ShapeType>().is_err());
    }

    #[test]
    fn test_coord_serializes_as_pair() {
        let json = serde_json::to_string(&Coord(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
    }
}
