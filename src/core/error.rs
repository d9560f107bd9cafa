use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartCountError {
    #[error("{0} does not exist")]
    NotFound(String),

    #[error(
        "{0} is not a supported geometry shape type. Please select a Multipoint, Polyline, or Polygon"
    )]
    UnsupportedGeometryType(String),

    #[error("The field {field} already exists in {dataset}")]
    FieldExists { field: String, dataset: String },

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Feature class '{0}' already exists")]
    FeatureClassExists(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Field '{0}' not found in '{1}'")]
    ColumnNotFound(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartCountError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PartCountError>;

impl From<rmp_serde::encode::Error> for PartCountError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for PartCountError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PartCountError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
