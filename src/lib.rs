// ============================================================================
// partcount Library
// ============================================================================

pub mod config;
pub mod core;
pub mod dataset;
pub mod processor;
pub mod query;
pub mod storage;

// Re-export main types for convenience
pub use config::{CountOptions, DEFAULT_FIELD_NAME, Settings};
pub use core::{
    ClassSchema, Coord, Field, FieldType, Geometry, PartCountError, Result, ShapeType, Value,
};
pub use dataset::{
    Dataset, EditSession, FeatureRow, OID_TOKEN, RowUpdater, SHAPE_TOKEN, SearchCursor,
    UpdateCursor,
};
pub use processor::{
    CountOutcome, CountReport, PartCountMap, collect_part_counts, count_multipart,
    count_multipart_in_workspace, multipart_filter,
};
pub use storage::{Describe, FeatureClass, FeatureClassDocument, Workspace};
