#![allow(dead_code)]

use partcount::{ClassSchema, Coord, Field, FieldType, Geometry, ShapeType, Value, Workspace};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const WORKSPACE: &str = "city.pcdb";

/// `parts` closed triangles offset along the x axis.
pub fn polygon(parts: usize) -> Geometry {
    let rings = (0..parts)
        .map(|i| {
            let x = (i * 10) as f64;
            vec![
                Coord(x, 0.0),
                Coord(x + 1.0, 0.0),
                Coord(x + 1.0, 1.0),
                Coord(x, 0.0),
            ]
        })
        .collect();
    Geometry::new(ShapeType::Polygon, rings)
}

pub fn workspace_path(dir: &TempDir) -> PathBuf {
    dir.path().join(WORKSPACE)
}

/// Polygon class with one geometry per entry; `None` stores a null shape.
pub fn polygon_class(
    workspace: &Path,
    name: &str,
    part_counts: &[Option<usize>],
    extra_fields: &[Field],
) -> PathBuf {
    let mut ws = Workspace::open_or_create(workspace).unwrap();
    let mut schema = ClassSchema::standard(name, ShapeType::Polygon);
    for field in extra_fields {
        schema = schema.with_field(field.clone()).unwrap();
    }
    let class = ws.create_feature_class(schema).unwrap();
    for parts in part_counts {
        class.insert(parts.map(polygon), &[]).unwrap();
    }
    ws.save().unwrap();
    workspace.join(name)
}

/// The three-row scenario: object ids 1, 2, 3 with 1, 3 and 5 parts.
pub fn parcels(dir: &TempDir) -> PathBuf {
    polygon_class(
        &workspace_path(dir),
        "parcels",
        &[Some(1), Some(3), Some(5)],
        &[Field::new("NAME", FieldType::Text)],
    )
}

/// Value of `field` per object id, in id order.
pub fn column(dataset: &Path, field: &str) -> Vec<(i64, Value)> {
    let dataset = partcount::Dataset::open(dataset).unwrap();
    dataset
        .read_rows(&["OID@", field], None)
        .unwrap()
        .map(|row| {
            let values = row.unwrap().into_values();
            (values[0].as_i64().unwrap(), values[1].clone())
        })
        .collect()
}

pub fn file_bytes(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}
