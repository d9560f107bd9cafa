pub mod import;
pub mod persistence;
pub mod table;
pub mod workspace;

pub use import::FeatureClassDocument;
pub use persistence::{SnapshotManager, WorkspaceSnapshot};
pub use table::FeatureClass;
pub use workspace::{Describe, FieldInfo, Workspace};
