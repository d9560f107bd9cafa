pub mod error;
pub mod geometry;
pub mod types;
pub mod value;

pub use error::{PartCountError, Result};
pub use geometry::{Coord, Geometry, ShapeType};
pub use types::{ClassSchema, Field, Row, validate_field_name};
pub use value::{FieldType, Value};
