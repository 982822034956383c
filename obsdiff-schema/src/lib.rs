//! Dataset tree model for obsdiff.
//!
//! This crate provides:
//! - The closed dtype taxonomy and its comparison-kind classification
//! - Attribute values and flattened payloads with a missing-value mask
//! - The group/variable tree and structure extraction
//! - The `DatasetStore` seam to the data-access layer, with a JSON-backed
//!   implementation used for fixtures

pub mod dataset;
pub mod dtype;
pub mod store;
pub mod value;

pub use dataset::{
    extract_structure, DatasetFile, GroupNode, SchemaError, Structure, Variable, ROOT_PATH,
};
pub use dtype::{DType, DTypeKind};
pub use store::{DatasetStore, JsonDatasetStore, StoreError};
pub use value::{AttrValue, Payload};
