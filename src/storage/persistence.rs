//! On-disk format of a workspace: one MessagePack snapshot per file.

use crate::core::{PartCountError, Result};
use crate::storage::table::FeatureClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub version: u32,
    pub feature_classes: BTreeMap<String, FeatureClass>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub saved_at: DateTime<Utc>,
    pub row_count: usize,
    pub feature_class_count: usize,
}

impl WorkspaceSnapshot {
    pub fn new(feature_classes: BTreeMap<String, FeatureClass>) -> Self {
        let row_count = feature_classes.values().map(FeatureClass::row_count).sum();
        let feature_class_count = feature_classes.len();

        Self {
            version: SNAPSHOT_VERSION,
            feature_classes,
            metadata: SnapshotMetadata {
                saved_at: Utc::now(),
                row_count,
                feature_class_count,
            },
        }
    }
}

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.is_file()
    }

    /// Write the snapshot next to its target and rename it into place.
    pub fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        let parent = match self.snapshot_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            rmp_serde::encode::write_named(&mut writer, snapshot)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.snapshot_path)
            .map_err(|e| PartCountError::IoError(e.error))?;

        debug!(
            path = %self.snapshot_path.display(),
            feature_classes = snapshot.metadata.feature_class_count,
            rows = snapshot.metadata.row_count,
            "workspace snapshot saved"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<WorkspaceSnapshot> {
        let file = File::open(&self.snapshot_path)?;
        let reader = BufReader::new(file);
        let snapshot: WorkspaceSnapshot = rmp_serde::from_read(reader)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PartCountError::Serialization(format!(
                "Unsupported workspace version {} in {} (expected {})",
                snapshot.version,
                self.snapshot_path.display(),
                SNAPSHOT_VERSION
            )));
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassSchema, ShapeType};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path().join("city.pcdb"));
        assert!(!manager.exists());

        let mut classes = BTreeMap::new();
        let mut roads = FeatureClass::new(ClassSchema::standard("roads", ShapeType::Polyline));
        roads.insert(None, &[]).unwrap();
        classes.insert("roads".to_string(), roads.clone());

        manager.save(&WorkspaceSnapshot::new(classes)).unwrap();
        assert!(manager.exists());

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.metadata.feature_class_count, 1);
        assert_eq!(loaded.metadata.row_count, 1);
        assert_eq!(loaded.feature_classes["roads"], roads);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pcdb");
        fs::write(&path, b"not a workspace").unwrap();

        let result = SnapshotManager::new(&path).load();
        assert!(matches!(result, Err(PartCountError::Serialization(_))));
    }
}
