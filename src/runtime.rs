//! Start/stop of a mock server instance.
//!
//! [`start`] returns the server value that [`stop`] consumes; there is no
//! process-wide handle. The HTTP listener itself is provided by the embedding
//! server, which reads [`MockServer::port`] and serves from
//! [`MockServer::registry`].

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::CorsHeaders;
use crate::file_source::{DirectoryFileSource, FileSource};
use crate::headers::HeaderAugmenter;
use crate::mapping_error::MappingError;
use crate::mapping_store::MappingStore;
use crate::path_resolver::Partitioning;
use crate::registry::InMemoryRegistry;

/// Sub-directory of the files root holding mapping files.
pub const MAPPINGS_ROOT: &str = "mappings";
pub const DEFAULT_PORT: u16 = 5868;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    pub port: u16,
    pub files_root: PathBuf,
    pub partitioning: Partitioning,
    pub cors: CorsHeaders,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            files_root: PathBuf::from("./wiremock"),
            partitioning: Partitioning::default(),
            cors: CorsHeaders::default(),
        }
    }
}

pub struct MockServer {
    port: u16,
    registry: Arc<InMemoryRegistry>,
    store: MappingStore<DirectoryFileSource>,
}

impl MockServer {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn registry(&self) -> &Arc<InMemoryRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &MappingStore<DirectoryFileSource> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MappingStore<DirectoryFileSource> {
        &mut self.store
    }
}

/// Loads every mapping under `<files_root>/mappings` into a fresh registry.
///
/// Fails only when a mapping file does not parse.
pub fn start(options: ServerOptions) -> Result<MockServer, MappingError> {
    let files = DirectoryFileSource::new(&options.files_root).child(MAPPINGS_ROOT);
    let mut store = MappingStore::new(files, options.partitioning, HeaderAugmenter::new(&options.cors));
    let registry = Arc::new(InMemoryRegistry::new());
    store.load_mappings_into(registry.clone())?;

    info!(
        "Mock server ready on port {} with {} registered mappings",
        options.port,
        registry.len()
    );
    Ok(MockServer { port: options.port, registry, store })
}

/// Shuts the server down and returns how many mapping files it still indexed.
pub fn stop(server: MockServer) -> usize {
    let indexed = server.store.indexed_len();
    info!("Stopping mock server on port {} ({} indexed mapping files)", server.port, indexed);
    indexed
}
