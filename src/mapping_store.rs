//! File-backed mapping storage kept in step with the live registry.
//!
//! [`MappingStore`] owns the path index (mapping id to file path) and pushes
//! every mapping it loads or saves into the bound [`MappingRegistry`] along
//! with a derived CORS preflight mapping. Before a mapping is registered it is
//! passed through the disabled-rule rewrite and the default header merge;
//! neither change is ever written back to disk.
//!
//! File-system failures during save and remove are logged and absorbed. Only
//! an unparsable mapping file is reported, and it aborts the load pass.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::disabled_rule;
use crate::file_source::{DirectoryFileSource, FileSource, TextFile};
use crate::headers::HeaderAugmenter;
use crate::mapping_error::MappingError;
use crate::mapping_model::{Mapping, MappingFile};
use crate::path_resolver::{Partitioning, PathResolver};
use crate::preflight::PreflightSynthesizer;
use crate::registry::MappingRegistry;

const MAPPING_EXTENSION: &str = "json";

pub struct MappingStore<S: FileSource> {
    files: S,
    resolver: PathResolver,
    headers: HeaderAugmenter,
    preflight: PreflightSynthesizer,
    paths: HashMap<Uuid, PathBuf>,
    /// Source mapping id to the id of its preflight sibling.
    preflights: HashMap<Uuid, Uuid>,
    registry: Option<Arc<dyn MappingRegistry>>,
    /// Registrations made before a registry was bound.
    pending: Vec<Mapping>,
}

impl MappingStore<DirectoryFileSource> {
    /// Store over the directory named in `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            DirectoryFileSource::new(&config.root),
            config.partitioning,
            HeaderAugmenter::new(&config.cors),
        )
    }
}

impl<S: FileSource> MappingStore<S> {
    pub fn new(files: S, partitioning: Partitioning, headers: HeaderAugmenter) -> Self {
        Self {
            files,
            resolver: PathResolver::new(partitioning),
            preflight: PreflightSynthesizer::new(headers.clone()),
            headers,
            paths: HashMap::new(),
            preflights: HashMap::new(),
            registry: None,
            pending: Vec::new(),
        }
    }

    pub fn file_source(&self) -> &S {
        &self.files
    }

    pub fn indexed_path(&self, id: &Uuid) -> Option<&Path> {
        self.paths.get(id).map(PathBuf::as_path)
    }

    pub fn indexed_len(&self) -> usize {
        self.paths.len()
    }

    /// Id of the preflight mapping derived from `id`, if one is registered.
    pub fn preflight_of(&self, id: &Uuid) -> Option<Uuid> {
        self.preflights.get(id).copied()
    }

    pub fn is_bound(&self) -> bool {
        self.registry.is_some()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Writes `mapping` to its resolved path and registers it with its
    /// preflight sibling. Returns the path written, relative to the root.
    ///
    /// When the mapping carries `file_name` metadata and was previously
    /// indexed elsewhere, the old file is deleted first. A mapping that came
    /// from a collection file is written back into that collection, leaving
    /// its siblings in place.
    pub fn save(&mut self, mapping: &mut Mapping) -> PathBuf {
        let known = self.paths.get(&mapping.id).cloned();
        let path = self.resolver.resolve(&self.files, mapping, known.as_deref());

        if mapping.metadata.file_name().is_some() {
            if let Some(previous) = known.as_deref().filter(|previous| *previous != path.as_path()) {
                self.release_file(&mapping.id, previous);
            }
        }

        let spliced = known.as_deref() == Some(path.as_path())
            && self.shares_file(&mapping.id, &path)
            && self.rewrite_collection(&path, &mapping.id, Some(&*mapping));
        if !spliced {
            match serde_json::to_string_pretty(mapping) {
                Ok(json) => self.write_file(&path, &json, &mapping.id),
                Err(e) => warn!("Could not serialize mapping {}: {e}", mapping.id),
            }
        }

        self.paths.insert(mapping.id, path.clone());
        mapping.dirty = false;
        self.register_with_preflight(mapping.clone());
        path
    }

    /// Saves every dirty mapping. Each save stands alone.
    pub fn save_all(&mut self, mappings: &mut [Mapping]) {
        for mapping in mappings.iter_mut().filter(|mapping| mapping.dirty) {
            self.save(mapping);
        }
    }

    /// Deletes the file behind `mapping` and drops its index entry and its
    /// preflight sibling. The mapping itself stays in the registry; removing
    /// it there is the caller's job.
    ///
    /// A derived preflight has no file of its own: removing one only stops
    /// tracking it. A member of a collection file is dropped from the
    /// collection.
    pub fn remove(&mut self, mapping: &Mapping) {
        if let Some(source) = self.preflight_source(&mapping.id) {
            debug!("Mapping {} is the preflight of {source}; no file to delete", mapping.id);
            self.preflights.remove(&source);
            return;
        }

        let path = self.resolver.removal_path(mapping, self.indexed_path(&mapping.id));
        self.release_file(&mapping.id, &path);
        self.paths.remove(&mapping.id);
        if let Some(preflight) = self.preflights.remove(&mapping.id) {
            self.unregister(&preflight);
        }
    }

    /// Deletes every indexed file and clears the index. Files that never made
    /// it into the index are not touched.
    pub fn remove_all(&mut self) {
        let paths: BTreeSet<PathBuf> = self.paths.drain().map(|(_, path)| path).collect();
        for path in &paths {
            self.delete_file(path);
        }

        let preflights: Vec<Uuid> = self.preflights.drain().map(|(_, id)| id).collect();
        for id in &preflights {
            self.unregister(id);
        }
        info!("Removed {} mapping files", paths.len());
    }

    /// Binds `registry` (first call only) and registers every mapping found
    /// in `.json` files under the root, each with its preflight sibling.
    ///
    /// A file that does not parse stops the pass with
    /// [`MappingError::MappingFile`]; mappings from earlier files stay
    /// registered.
    pub fn load_mappings_into(&mut self, registry: Arc<dyn MappingRegistry>) -> Result<(), MappingError> {
        self.bind(registry);

        if !self.files.exists() {
            info!("No mappings directory at {}", self.files.path().display());
            return Ok(());
        }

        let files = match self.files.list_files_recursively() {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list mappings under {}: {e}", self.files.path().display());
                return Ok(());
            }
        };

        let mapping_files: Vec<TextFile> = files
            .into_iter()
            .filter(|file| file.has_extension(MAPPING_EXTENSION))
            .collect();
        info!("Loading {} mapping files from {}", mapping_files.len(), self.files.path().display());

        for file in &mapping_files {
            self.load_file(file)?;
        }
        Ok(())
    }

    fn load_file(&mut self, file: &TextFile) -> Result<(), MappingError> {
        let contents = match self.files.read_text_file(file.relative_path()) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read {}: {e}", file.path().display());
                return Ok(());
            }
        };

        let parsed = MappingFile::parse(&contents)
            .map_err(|e| MappingError::mapping_file(file.path().display().to_string(), e.to_string()))?;

        for mut mapping in parsed.into_mappings() {
            mapping.dirty = false;
            self.paths.insert(mapping.id, file.relative_path().to_path_buf());
            self.register_with_preflight(mapping);
        }
        Ok(())
    }

    fn bind(&mut self, registry: Arc<dyn MappingRegistry>) {
        if self.registry.is_some() {
            debug!("Mapping registry already bound; ignoring rebind");
            return;
        }

        for mapping in mem::take(&mut self.pending) {
            registry.add_mapping(mapping);
        }
        self.registry = Some(registry);
    }

    /// Registers the rewritten, header-augmented mapping and a preflight
    /// derived from the untouched copy, replacing any earlier preflight.
    fn register_with_preflight(&mut self, mapping: Mapping) {
        let preflight = if mapping.request.url.is_resolvable() {
            Some(self.preflight.synthesize(&mapping))
        } else {
            debug!("Mapping {} matches any URL; no preflight derived", mapping.id);
            None
        };

        let mut primary = mapping;
        disabled_rule::rewrite(&mut primary);
        primary.response = self.headers.augment(primary.response);

        let replaced = match &preflight {
            Some(derived) => self.preflights.insert(primary.id, derived.id),
            None => self.preflights.remove(&primary.id),
        };
        if let Some(old) = replaced {
            self.unregister(&old);
        }

        self.register(primary);
        if let Some(derived) = preflight {
            self.register(derived);
        }
    }

    fn register(&mut self, mapping: Mapping) {
        match &self.registry {
            Some(registry) => registry.add_mapping(mapping),
            None => {
                self.pending.retain(|pending| pending.id != mapping.id);
                self.pending.push(mapping);
            }
        }
    }

    fn unregister(&mut self, id: &Uuid) {
        match &self.registry {
            Some(registry) => {
                registry.remove_mapping(id);
            }
            None => self.pending.retain(|mapping| mapping.id != *id),
        }
    }

    fn preflight_source(&self, id: &Uuid) -> Option<Uuid> {
        self.preflights
            .iter()
            .find(|(_, preflight)| *preflight == id)
            .map(|(source, _)| *source)
    }

    /// Whether another indexed mapping is backed by the file at `path`.
    fn shares_file(&self, id: &Uuid, path: &Path) -> bool {
        self.paths.iter().any(|(other, indexed)| other != id && indexed == path)
    }

    /// Lets go of the file backing `id`: drops the entry from a shared
    /// collection file, or deletes the file outright.
    fn release_file(&self, id: &Uuid, path: &Path) {
        if !(self.shares_file(id, path) && self.rewrite_collection(path, id, None)) {
            self.delete_file(path);
        }
    }

    /// Rewrites the collection file at `path` with the entry for `id`
    /// replaced by `replacement`, or dropped when there is none. Returns false
    /// when the file does not hold a readable collection.
    fn rewrite_collection(&self, path: &Path, id: &Uuid, replacement: Option<&Mapping>) -> bool {
        let contents = match self.files.read_text_file(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read collection {}: {e}", self.display(path));
                return false;
            }
        };
        let mut mappings = match MappingFile::parse(&contents) {
            Ok(MappingFile::Collection(mappings)) => mappings,
            Ok(MappingFile::Single(_)) => return false,
            Err(e) => {
                warn!("Could not parse collection {}: {e}", self.display(path));
                return false;
            }
        };

        match replacement {
            Some(mapping) => match mappings.iter_mut().find(|entry| entry.id == *id) {
                Some(entry) => *entry = mapping.clone(),
                None => mappings.push(mapping.clone()),
            },
            None => mappings.retain(|entry| entry.id != *id),
        }

        match MappingFile::Collection(mappings).to_json_pretty() {
            Ok(json) => {
                self.write_file(path, &json, id);
                true
            }
            Err(e) => {
                warn!("Could not serialize collection {}: {e}", self.display(path));
                false
            }
        }
    }

    fn write_file(&self, path: &Path, json: &str, id: &Uuid) {
        if let Err(e) = self.files.write_text_file(path, json) {
            warn!("Could not write mapping {id} to {}: {e}", self.display(path));
        }
    }

    fn delete_file(&self, path: &Path) {
        match self.files.delete_file(path) {
            Ok(()) => debug!("Deleted {}", self.display(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", self.display(path))
            }
            Err(e) => warn!("Could not delete {}: {e}", self.display(path)),
        }
    }

    fn display(&self, path: &Path) -> String {
        self.files.path().join(path).display().to_string()
    }
}
