//! Store configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "root": "./wiremock/mappings", "partitioning": "flat" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::mapping_error::MappingError;
use crate::path_resolver::Partitioning;

/// Header names browsers may send on cross-origin calls to the mocks.
pub const DEFAULT_ALLOWED_HEADERS: &[&str] = &[
    "authorization",
    "caller-id",
    "channel",
    "content-type",
    "correlation-id",
    "device-info",
    "expires",
    "pragma",
    "session-id",
    "timestamp",
];

/// Values of the CORS headers added to every registered response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsHeaders {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: Vec<String>,
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "*".to_string(),
            allow_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the mapping files.
    pub root: PathBuf,
    pub partitioning: Partitioning,
    pub cors: CorsHeaders,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./wiremock/mappings"),
            partitioning: Partitioning::default(),
            cors: CorsHeaders::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, MappingError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
