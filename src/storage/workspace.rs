use super::persistence::{SnapshotManager, WorkspaceSnapshot};
use super::table::FeatureClass;
use crate::core::{ClassSchema, Field, FieldType, PartCountError, Result, ShapeType};
use regex::Regex;
use serde::Serialize;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema and location of one feature class, as reported by
/// [`Workspace::describe`].
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    pub catalog_path: PathBuf,
    pub workspace_path: PathBuf,
    pub base_name: String,
    pub shape_type: ShapeType,
    pub oid_field_name: String,
    pub shape_field_name: String,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

impl From<&Field> for FieldInfo {
    fn from(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type,
            nullable: field.nullable,
        }
    }
}

/// A file holding a set of feature classes.
///
/// Outside an edit session every schema change is written to disk as soon as
/// it succeeds. Inside one, changes stay in memory until
/// [`stop_editing`](Self::stop_editing) saves or discards them.
pub struct Workspace {
    snapshots: SnapshotManager,
    classes: BTreeMap<String, FeatureClass>,
    edit_baseline: Option<BTreeMap<String, FeatureClass>>,
    readers: Cell<usize>,
}

impl Workspace {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshots = SnapshotManager::new(path.as_ref());
        if !snapshots.exists() {
            return Err(PartCountError::NotFound(path.as_ref().display().to_string()));
        }
        let snapshot = snapshots.load()?;
        debug!(
            path = %path.as_ref().display(),
            feature_classes = snapshot.feature_classes.len(),
            "workspace opened"
        );

        Ok(Self {
            snapshots,
            classes: snapshot.feature_classes,
            edit_baseline: None,
            readers: Cell::new(0),
        })
    }

    /// Create an empty workspace file. Fails if the file already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshots = SnapshotManager::new(path.as_ref());
        if path.as_ref().exists() {
            return Err(PartCountError::execution(format!(
                "{} already exists",
                path.as_ref().display()
            )));
        }

        let workspace = Self {
            snapshots,
            classes: BTreeMap::new(),
            edit_baseline: None,
            readers: Cell::new(0),
        };
        workspace.save()?;
        info!(path = %path.as_ref().display(), "workspace created");
        Ok(workspace)
    }

    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Split `<workspace file>/<feature class>` into its two halves.
    pub fn split_dataset_path(path: &Path) -> Option<(PathBuf, String)> {
        let name = path.file_name()?.to_str()?.to_string();
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            return None;
        }
        Some((parent.to_path_buf(), name))
    }

    /// Whether `path` names an existing feature class in a readable workspace.
    pub fn dataset_exists<P: AsRef<Path>>(path: P) -> bool {
        let Some((workspace_path, name)) = Self::split_dataset_path(path.as_ref()) else {
            return false;
        };
        if !workspace_path.is_file() {
            return false;
        }
        Self::open(&workspace_path)
            .map(|ws| ws.contains(&name))
            .unwrap_or(false)
    }

    pub fn path(&self) -> &Path {
        self.snapshots.path()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn save(&self) -> Result<()> {
        self.snapshots
            .save(&WorkspaceSnapshot::new(self.classes.clone()))
    }

    /// Feature class names matching `wildcard` (`*` matches any run of
    /// characters, case-insensitive), sorted.
    pub fn list_feature_classes(&self, wildcard: Option<&str>) -> Result<Vec<String>> {
        let matcher = wildcard.map(wildcard_regex).transpose()?;
        Ok(self
            .classes
            .keys()
            .filter(|name| matcher.as_ref().is_none_or(|re| re.is_match(name)))
            .cloned()
            .collect())
    }

    pub fn feature_class(&self, name: &str) -> Result<&FeatureClass> {
        self.classes
            .get(name)
            .ok_or_else(|| PartCountError::NotFound(self.catalog_path(name).display().to_string()))
    }

    pub(crate) fn feature_class_mut(&mut self, name: &str) -> Result<&mut FeatureClass> {
        let catalog_path = self.catalog_path(name);
        self.classes
            .get_mut(name)
            .ok_or_else(|| PartCountError::NotFound(catalog_path.display().to_string()))
    }

    pub fn catalog_path(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn describe(&self, name: &str) -> Result<Describe> {
        let class = self.feature_class(name)?;
        let schema = class.schema();

        Ok(Describe {
            catalog_path: self.catalog_path(name),
            workspace_path: self.path().to_path_buf(),
            base_name: name.to_string(),
            shape_type: schema.shape_type(),
            oid_field_name: schema.oid_field_name().to_string(),
            shape_field_name: schema.shape_field_name().to_string(),
            fields: schema.fields().iter().map(FieldInfo::from).collect(),
        })
    }

    pub fn create_feature_class(&mut self, schema: ClassSchema) -> Result<&mut FeatureClass> {
        let name = schema.name().to_string();
        if self.classes.contains_key(&name) {
            return Err(PartCountError::FeatureClassExists(name));
        }
        self.classes.insert(name.clone(), FeatureClass::new(schema));
        self.autocommit()?;
        self.feature_class_mut(&name)
    }

    /// Store `class` under its schema name, replacing any previous class.
    pub fn put_feature_class(&mut self, class: FeatureClass) -> Result<()> {
        let name = class.name().to_string();
        if self.classes.insert(name.clone(), class).is_some() {
            debug!(feature_class = %name, "feature class replaced");
        }
        self.autocommit()
    }

    pub fn delete_feature_class(&mut self, name: &str) -> Result<()> {
        if self.classes.remove(name).is_none() {
            return Err(PartCountError::NotFound(self.catalog_path(name).display().to_string()));
        }
        self.autocommit()
    }

    pub fn add_field(&mut self, class: &str, field: Field) -> Result<()> {
        let field_name = field.name.clone();
        let field_type = field.field_type;
        self.feature_class_mut(class)?.add_field(field)?;
        info!(feature_class = %class, field = %field_name, %field_type, "field added");
        self.autocommit()
    }

    pub fn delete_field(&mut self, class: &str, name: &str) -> Result<()> {
        self.feature_class_mut(class)?.delete_field(name)?;
        info!(feature_class = %class, field = %name, "field deleted");
        self.autocommit()
    }

    pub fn is_editing(&self) -> bool {
        self.edit_baseline.is_some()
    }

    pub fn start_editing(&mut self) -> Result<()> {
        if self.is_editing() {
            return Err(PartCountError::execution(format!(
                "An edit session is already open on {}",
                self.path().display()
            )));
        }
        if self.active_readers() > 0 {
            return Err(PartCountError::execution(format!(
                "Cannot start editing {}: {} read cursor(s) still open",
                self.path().display(),
                self.active_readers()
            )));
        }
        self.edit_baseline = Some(self.classes.clone());
        debug!(path = %self.path().display(), "edit session started");
        Ok(())
    }

    /// Close the edit session, either writing its changes or restoring the
    /// state it started from.
    pub fn stop_editing(&mut self, save: bool) -> Result<()> {
        let Some(baseline) = self.edit_baseline.take() else {
            return Err(PartCountError::execution(format!(
                "No edit session is open on {}",
                self.path().display()
            )));
        };

        if save {
            self.save()?;
            debug!(path = %self.path().display(), "edit session saved");
        } else {
            self.classes = baseline;
            debug!(path = %self.path().display(), "edit session discarded");
        }
        Ok(())
    }

    pub fn active_readers(&self) -> usize {
        self.readers.get()
    }

    pub(crate) fn acquire_reader(&self) {
        self.readers.set(self.readers.get() + 1);
    }

    pub(crate) fn release_reader(&self) {
        self.readers.set(self.readers.get().saturating_sub(1));
    }

    /// Persist immediately unless an edit session is collecting changes.
    pub(crate) fn autocommit(&self) -> Result<()> {
        if self.is_editing() {
            return Ok(());
        }
        self.save()
    }
}

/// `*` matches any run of characters; everything else is literal.
fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?i)^{}$", body))
        .map_err(|e| PartCountError::ParseError(format!("Invalid wildcard '{}': {}", pattern, e)))
}
