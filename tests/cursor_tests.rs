//! Read/update cursor behaviour through the dataset handle

mod common;

use common::*;
use partcount::{Dataset, FieldType, PartCountError, Value};
use tempfile::TempDir;

#[test]
fn test_read_rows_projection_and_query() {
    let dir = TempDir::new().unwrap();
    let dataset = Dataset::open(parcels(&dir)).unwrap();

    let rows: Vec<_> = dataset
        .read_rows(&["OID@", "SHAPE@"], Some("OBJECTID IN (3,1)"))
        .unwrap()
        .map(|row| row.unwrap())
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fields(), &["OID@".to_string(), "SHAPE@".to_string()]);
    assert_eq!(rows[0].get("OID@"), Some(&Value::Integer(1)));
    assert_eq!(rows[1].get("oid@"), Some(&Value::Integer(3)));
    let shape = rows[1].get("SHAPE@").and_then(Value::as_geometry).unwrap();
    assert_eq!(shape.part_count(), 5);
}

#[test]
fn test_empty_query_selects_all_rows() {
    let dir = TempDir::new().unwrap();
    let dataset = Dataset::open(parcels(&dir)).unwrap();

    assert_eq!(dataset.read_rows(&["OID@"], Some("")).unwrap().count(), 3);
    assert_eq!(dataset.read_rows(&["OID@"], None).unwrap().count(), 3);
}

#[test]
fn test_pseudo_tokens_rejected_in_queries() {
    let dir = TempDir::new().unwrap();
    let dataset = Dataset::open(parcels(&dir)).unwrap();

    assert!(dataset.read_rows(&["OID@"], Some("OID@ IN (1)")).is_err());
    assert!(dataset.read_rows(&["OID@"], Some("FID IN (1)")).is_err());
    assert_eq!(dataset.active_readers(), 0);
}

#[test]
fn test_unknown_projection_field() {
    let dir = TempDir::new().unwrap();
    let dataset = Dataset::open(parcels(&dir)).unwrap();

    let result = dataset.read_rows(&["OID@", "AREA"], None);
    assert!(matches!(result, Err(PartCountError::ColumnNotFound(_, _))));
}

#[test]
fn test_read_cursor_released_on_early_break() {
    let dir = TempDir::new().unwrap();
    let mut dataset = Dataset::open(parcels(&dir)).unwrap();

    {
        let mut cursor = dataset.read_rows(&["OID@"], None).unwrap();
        assert_eq!(dataset.active_readers(), 1);
        let first = cursor.next().unwrap().unwrap();
        assert_eq!(first.get("OID@"), Some(&Value::Integer(1)));
    }
    assert_eq!(dataset.active_readers(), 0);

    let session = dataset.edit().unwrap();
    session.stop(false).unwrap();
}

#[test]
fn test_uncommitted_rows_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = parcels(&dir);
    let mut dataset = Dataset::open(&path).unwrap();

    {
        let mut cursor = dataset.update_rows(&["OID@", "NAME"], None).unwrap();
        while let Some(step) = cursor.next_row() {
            let (row, updater) = step.unwrap();
            if row.get("OID@") == Some(&Value::Integer(2)) {
                updater
                    .update_row(vec![Value::Integer(2), Value::from("corner lot")])
                    .unwrap();
            }
        }
        cursor.close().unwrap();
    }

    assert_eq!(
        column(&path, "NAME"),
        vec![
            (1, Value::Null),
            (2, Value::from("corner lot")),
            (3, Value::Null),
        ]
    );
}

#[test]
fn test_update_cursor_saves_when_dropped() {
    let dir = TempDir::new().unwrap();
    let path = parcels(&dir);
    let mut dataset = Dataset::open(&path).unwrap();

    {
        let mut cursor = dataset
            .update_rows(&["NAME"], Some("OBJECTID = 3"))
            .unwrap();
        let (_, updater) = cursor.next_row().unwrap().unwrap();
        updater.update_row(vec![Value::from("east")]).unwrap();
    }

    assert_eq!(column(&path, "NAME")[2], (3, Value::from("east")));
}

#[test]
fn test_update_row_validation() {
    let dir = TempDir::new().unwrap();
    let mut dataset = Dataset::open(parcels(&dir)).unwrap();
    let mut cursor = dataset.update_rows(&["OID@", "NAME"], None).unwrap();

    let (_, updater) = cursor.next_row().unwrap().unwrap();
    assert!(updater.update_row(vec![Value::Integer(1)]).is_err());

    let (_, updater) = cursor.next_row().unwrap().unwrap();
    let result = updater.update_row(vec![Value::Integer(2), Value::Integer(7)]);
    assert!(matches!(result, Err(PartCountError::TypeMismatch(_))));

    let (_, updater) = cursor.next_row().unwrap().unwrap();
    let result = updater.update_row(vec![Value::Integer(99), Value::from("x")]);
    assert!(result.is_err());

    assert!(cursor.next_row().is_none());
}

#[test]
fn test_field_names_follow_schema_changes() {
    let dir = TempDir::new().unwrap();
    let mut dataset = Dataset::open(parcels(&dir)).unwrap();
    assert_eq!(dataset.field_names().unwrap(), vec!["OBJECTID", "Shape", "NAME"]);

    dataset.add_field("Parts", FieldType::Short).unwrap();
    assert_eq!(dataset.field_names().unwrap(), vec!["OBJECTID", "Shape", "NAME", "Parts"]);

    dataset.delete_field("NAME").unwrap();
    assert_eq!(dataset.field_names().unwrap(), vec!["OBJECTID", "Shape", "Parts"]);
}

#[test]
fn test_schema_errors() {
    let dir = TempDir::new().unwrap();
    let mut dataset = Dataset::open(parcels(&dir)).unwrap();

    let cases = [
        dataset.add_field("name", FieldType::Short),
        dataset.add_field("1st", FieldType::Short),
        dataset.delete_field("OBJECTID"),
        dataset.delete_field("Shape"),
        dataset.delete_field("Missing"),
    ];
    for result in cases {
        assert!(matches!(result, Err(PartCountError::SchemaError(_))), "{:?}", result);
    }
}
