//! Core data model: configuration values and the sources they came from

pub mod source;
pub mod value;

pub use source::{SourceDescriptor, SourceKind};
pub use value::{mapping_from_pairs, Mapping, Scalar, Value};
