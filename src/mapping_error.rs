use std::fmt::{Display, Formatter};
use std::io::Error as IoError;

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Errors that escape the mapping store and its configuration layer.
///
/// Only [`MappingError::MappingFile`] leaves the store itself; file-system
/// failures during save and remove are logged and absorbed there.
#[derive(Debug, Serialize, Deserialize)]
pub enum MappingError {
    /// A mapping file could not be parsed. Aborts the whole load pass.
    MappingFile { path: String, detail: String },
    IoError(String),
    SerializationError(String),
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingError::MappingFile { path, detail } =>
                write!(f, "Error loading file {}:\n{}", path, detail),
            MappingError::IoError(msg) => write!(f, "IO error: {}", msg),
            MappingError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for MappingError {}

impl From<IoError> for MappingError {
    fn from(err: IoError) -> Self {
        MappingError::IoError(err.to_string())
    }
}

impl From<SerdeError> for MappingError {
    fn from(err: SerdeError) -> Self {
        MappingError::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl MappingError {
    pub fn mapping_file(path: impl Into<String>, detail: impl Into<String>) -> Self {
        MappingError::MappingFile { path: path.into(), detail: detail.into() }
    }
}
