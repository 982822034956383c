//! The seam to the data-access layer.
//!
//! `DatasetStore` is the boundary behind which the actual format decoder
//! lives. The shipped `JsonDatasetStore` reads the materialized-tree JSON
//! interchange format used by the validation fixtures; a decoder for the
//! binary scientific format plugs in behind the same trait.

use crate::dataset::DatasetFile;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a dataset file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read access to dataset files.
pub trait DatasetStore {
    /// Load the dataset at `path` into its in-memory tree.
    ///
    /// The underlying handle is held read-only for the duration of the load
    /// and released on every exit path. Unreadable or malformed sources are
    /// fatal and carry the originating path.
    fn load(&self, path: &Path) -> Result<DatasetFile, StoreError>;
}

/// Store reading the JSON materialized-tree format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDatasetStore;

impl DatasetStore for JsonDatasetStore {
    fn load(&self, path: &Path) -> Result<DatasetFile, StoreError> {
        let file = File::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        // The handle drops here on success and on error alike.
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::Malformed {
            path: path.display().to_string(),
            source: e,
        })
    }
}
