//! Handle on one feature class, addressed by `<workspace>/<name>`.

pub mod cursor;

pub use cursor::{FeatureRow, OID_TOKEN, RowUpdater, SHAPE_TOKEN, SearchCursor, UpdateCursor};

use crate::core::{Field, FieldType, PartCountError, Result, ShapeType};
use crate::storage::{Describe, Workspace};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An opened feature class.
///
/// Identity and shape type are captured once from the workspace's describe
/// call; [`field_names`](Self::field_names) always reflects the current
/// schema.
pub struct Dataset {
    workspace: Workspace,
    catalog_path: PathBuf,
    workspace_path: PathBuf,
    base_name: String,
    shape_type: ShapeType,
    oid_field_name: String,
    shape_field_name: String,
}

impl Dataset {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let not_found = || PartCountError::NotFound(path.display().to_string());

        let (workspace_path, name) = Workspace::split_dataset_path(path).ok_or_else(not_found)?;
        if !workspace_path.is_file() {
            return Err(not_found());
        }

        let workspace = Workspace::open(&workspace_path)?;
        if !workspace.contains(&name) {
            return Err(not_found());
        }
        Self::from_workspace(workspace, &name)
    }

    /// Open `name` inside an already loaded workspace.
    pub fn from_workspace(workspace: Workspace, name: &str) -> Result<Self> {
        let Describe {
            catalog_path,
            workspace_path,
            base_name,
            shape_type,
            oid_field_name,
            shape_field_name,
            ..
        } = workspace.describe(name)?;

        debug!(
            dataset = %catalog_path.display(),
            %shape_type,
            oid_field = %oid_field_name,
            "dataset opened"
        );

        Ok(Self {
            workspace,
            catalog_path,
            workspace_path,
            base_name,
            shape_type,
            oid_field_name,
            shape_field_name,
        })
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// Native object-id field name, as required inside where clauses.
    pub fn oid_field_name(&self) -> &str {
        &self.oid_field_name
    }

    pub fn shape_field_name(&self) -> &str {
        &self.shape_field_name
    }

    /// Token for reading the object id through a cursor.
    pub fn id_field(&self) -> &'static str {
        OID_TOKEN
    }

    /// Token for reading the geometry through a cursor.
    pub fn shape_field(&self) -> &'static str {
        SHAPE_TOKEN
    }

    pub fn describe(&self) -> Result<Describe> {
        self.workspace.describe(&self.base_name)
    }

    pub fn field_names(&self) -> Result<Vec<String>> {
        Ok(self.workspace.feature_class(&self.base_name)?.schema().field_names())
    }

    pub fn has_field(&self, name: &str) -> Result<bool> {
        Ok(self
            .workspace
            .feature_class(&self.base_name)?
            .schema()
            .find_field_index(name)
            .is_some())
    }

    pub fn row_count(&self) -> Result<usize> {
        Ok(self.workspace.feature_class(&self.base_name)?.row_count())
    }

    pub fn read_rows<S: AsRef<str>>(
        &self,
        fields: &[S],
        query: Option<&str>,
    ) -> Result<SearchCursor<'_>> {
        SearchCursor::open(&self.workspace, &self.base_name, fields, query)
    }

    pub fn update_rows<S: AsRef<str>>(
        &mut self,
        fields: &[S],
        query: Option<&str>,
    ) -> Result<UpdateCursor<'_>> {
        UpdateCursor::open(&mut self.workspace, &self.base_name, fields, query)
    }

    /// Add a nullable attribute column. Fails with a schema error if a field
    /// with that name already exists.
    pub fn add_field(&mut self, name: &str, field_type: FieldType) -> Result<()> {
        self.workspace
            .add_field(&self.base_name, Field::new(name, field_type))
    }

    pub fn delete_field(&mut self, name: &str) -> Result<()> {
        self.workspace.delete_field(&self.base_name, name)
    }

    /// Start an edit session. Edits made through the returned guard are saved
    /// by [`EditSession::stop`]; dropping the guard discards them.
    pub fn edit(&mut self) -> Result<EditSession<'_>> {
        self.workspace.start_editing()?;
        Ok(EditSession {
            dataset: self,
            open: true,
        })
    }

    pub fn is_editing(&self) -> bool {
        self.workspace.is_editing()
    }

    pub fn active_readers(&self) -> usize {
        self.workspace.active_readers()
    }

    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }
}

pub struct EditSession<'a> {
    dataset: &'a mut Dataset,
    open: bool,
}

impl EditSession<'_> {
    pub fn stop(mut self, save: bool) -> Result<()> {
        self.open = false;
        self.dataset.workspace.stop_editing(save)
    }
}

impl Deref for EditSession<'_> {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        self.dataset
    }
}

impl DerefMut for EditSession<'_> {
    fn deref_mut(&mut self) -> &mut Dataset {
        self.dataset
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(err) = self.dataset.workspace.stop_editing(false) {
            warn!(
                dataset = %self.dataset.catalog_path.display(),
                error = %err,
                "failed to discard edit session"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassSchema, Geometry, Value};
    use tempfile::TempDir;

    fn wells(dir: &TempDir) -> PathBuf {
        let ws_path = dir.path().join("field.pcdb");
        let mut ws = Workspace::create(&ws_path).unwrap();
        let class = ws
            .create_feature_class(ClassSchema::standard("wells", ShapeType::Point))
            .unwrap();
        class.insert(Some(Geometry::point(1.0, 2.0)), &[]).unwrap();
        class.insert(None, &[]).unwrap();
        ws.save().unwrap();
        ws_path.join("wells")
    }

    #[test]
    fn test_open_captures_describe() {
        let dir = TempDir::new().unwrap();
        let path = wells(&dir);
        let dataset = Dataset::open(&path).unwrap();

        assert_eq!(dataset.catalog_path(), path.as_path());
        assert_eq!(dataset.workspace_path(), dir.path().join("field.pcdb").as_path());
        assert_eq!(dataset.base_name(), "wells");
        assert_eq!(dataset.shape_type(), ShapeType::Point);
        assert_eq!(dataset.oid_field_name(), "OBJECTID");
        assert_eq!(dataset.id_field(), "OID@");
        assert_eq!(dataset.shape_field(), "SHAPE@");
        assert_eq!(dataset.row_count().unwrap(), 2);
    }

    #[test]
    fn test_open_missing_paths() {
        let dir = TempDir::new().unwrap();
        wells(&dir);

        for missing in [
            dir.path().join("field.pcdb").join("springs"),
            dir.path().join("other.pcdb").join("wells"),
            PathBuf::from("wells"),
        ] {
            let result = Dataset::open(&missing);
            assert!(matches!(result, Err(PartCountError::NotFound(_))), "{:?}", missing);
        }
    }

    #[test]
    fn test_edit_session_dropped_discards() {
        let dir = TempDir::new().unwrap();
        let mut dataset = Dataset::open(wells(&dir)).unwrap();

        {
            let mut session = dataset.edit().unwrap();
            session.add_field("DEPTH", FieldType::Short).unwrap();
            assert!(session.has_field("DEPTH").unwrap());
        }

        assert!(!dataset.is_editing());
        assert!(!dataset.has_field("DEPTH").unwrap());
    }

    #[test]
    fn test_field_lookup_fails_when_class_removed() {
        let dir = TempDir::new().unwrap();
        let mut dataset = Dataset::open(wells(&dir)).unwrap();
        dataset.workspace.delete_feature_class("wells").unwrap();

        assert!(matches!(dataset.field_names(), Err(PartCountError::NotFound(_))));
        assert!(matches!(dataset.has_field("DEPTH"), Err(PartCountError::NotFound(_))));
    }

    #[test]
    fn test_edit_session_stop_saves() {
        let dir = TempDir::new().unwrap();
        let path = wells(&dir);
        let mut dataset = Dataset::open(&path).unwrap();

        let mut session = dataset.edit().unwrap();
        session.add_field("DEPTH", FieldType::Short).unwrap();
        {
            let mut cursor = session.update_rows(&["OID@", "DEPTH"], None).unwrap();
            while let Some(step) = cursor.next_row() {
                let (row, updater) = step.unwrap();
                let oid = row.get("OID@").and_then(Value::as_i64).unwrap();
                updater
                    .update_row(vec![Value::Integer(oid), Value::Integer(oid * 10)])
                    .unwrap();
            }
        }
        session.stop(true).unwrap();

        let reopened = Dataset::open(&path).unwrap();
        let depths: Vec<Value> = reopened
            .read_rows(&["DEPTH"], None)
            .unwrap()
            .map(|row| row.unwrap().values()[0].clone())
            .collect();
        assert_eq!(depths, vec![Value::Integer(10), Value::Integer(20)]);
    }
}
