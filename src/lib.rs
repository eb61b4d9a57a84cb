//! # Mock Mappings Core
//!
//! File-backed storage for mock API mappings (request pattern plus canned
//! response), kept in step with the in-memory registry a mock server matches
//! requests against.
//!
//! ## Features
//!
//! - **Directory layout**: mappings are grouped by `file_name` and `context`
//!   metadata into `[context/<C>/]<file_name>/<name>.json`
//! - **CORS preflight**: every loaded or saved mapping gets an OPTIONS sibling
//!   with an empty 200 response
//! - **Default headers**: CORS headers are merged into every registered
//!   response without overriding headers the mapping defines
//! - **Disabled mappings**: `status: DISABLED` metadata makes a regex URL rule
//!   unmatchable in memory while the file stays as written
//! - **Collections**: a file may hold one mapping or `{"mappings": [...]}`
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mock_mappings_core::{
//!     InMemoryRegistry, Mapping, MappingStore, RequestMethod, StoreConfig, UrlPattern,
//! };
//!
//! let mut store = MappingStore::from_config(&StoreConfig::default());
//! let registry = Arc::new(InMemoryRegistry::new());
//! store.load_mappings_into(registry.clone())?;
//!
//! let mut login = Mapping::new(RequestMethod::new("GET"), UrlPattern::url("/api/login"))
//!     .with_name("login")
//!     .with_metadata("file_name", "auth");
//! let path = store.save(&mut login);
//!
//! assert_eq!(path, std::path::Path::new("auth/login.json"));
//! # Ok::<(), mock_mappings_core::MappingError>(())
//! ```
//!
//! ## Error Policy
//!
//! Only an unparsable mapping file is reported ([`MappingError::MappingFile`]);
//! it aborts the load pass. Failed directory creation, writes and deletes are
//! logged through the `log` facade and otherwise ignored.
//!
//! ## Concurrency
//!
//! [`MappingStore`] has no internal locking. Callers serialize saves, removes
//! and loads. [`InMemoryRegistry`] is safe to share with the matching engine.

pub mod admin;
pub mod config;
pub mod disabled_rule;
pub mod file_source;
pub mod headers;
pub mod mapping_error;
pub mod mapping_model;
pub mod mapping_store;
pub mod path_resolver;
pub mod preflight;
pub mod registry;
pub mod runtime;

pub use crate::admin::{list_mappings, ListMappingsQuery, ListMappingsResult};
pub use crate::config::{CorsHeaders, StoreConfig};
pub use crate::file_source::{DirectoryFileSource, FileSource, TextFile};
pub use crate::headers::HeaderAugmenter;
pub use crate::mapping_error::MappingError;
pub use crate::mapping_model::{
    HeaderValue, HttpHeaders, Mapping, MappingFile, Metadata, RequestMethod, RequestPattern,
    ResponseDefinition, StringValuePattern, UrlPattern,
};
pub use crate::mapping_store::MappingStore;
pub use crate::path_resolver::{Partitioning, PathResolver};
pub use crate::preflight::PreflightSynthesizer;
pub use crate::registry::{InMemoryRegistry, MappingRegistry};
pub use crate::runtime::{start, stop, MockServer, ServerOptions};
