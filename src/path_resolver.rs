//! On-disk layout of mapping files.
//!
//! ```text
//! <root>/<safe-name>-<id>.json                         no metadata
//! <root>/<file_name>/<name>.json                       file_name
//! <root>/context/<context>/<safe-name>-<id>.json       context
//! <root>/context/<context>/<file_name>/<name>.json     context + file_name
//! ```

use std::path::{Component, Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::file_source::FileSource;
use crate::mapping_model::Mapping;

/// Top-level directory holding one sub-directory per context.
pub const CONTEXT_DIR: &str = "context";

const MAX_SAFE_NAME_LEN: usize = 200;
const UNSAFE_CHARS: &str = ",~:/?#[]@!$&'()*+;=";

/// How mappings are split into sub-trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partitioning {
    /// `context` metadata is ignored; everything lives under the root.
    Flat,
    /// Mappings with `context = C` live under `context/C/`.
    #[default]
    Context,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver {
    partitioning: Partitioning,
}

impl PathResolver {
    pub fn new(partitioning: Partitioning) -> Self {
        Self { partitioning }
    }

    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// `context/<C>` for a context-tagged mapping, when partitioning by context.
    pub fn context_prefix(&self, mapping: &Mapping) -> Option<PathBuf> {
        match self.partitioning {
            Partitioning::Flat => None,
            Partitioning::Context => contained(mapping, "context", mapping.metadata.context())
                .map(|context| Path::new(CONTEXT_DIR).join(context)),
        }
    }

    /// Path a mapping is saved to. Creates the directories the path implies.
    ///
    /// `known` is the path the mapping was last indexed under; it wins unless
    /// the mapping names an explicit `file_name` directory.
    pub fn resolve<S: FileSource>(&self, files: &S, mapping: &Mapping, known: Option<&Path>) -> PathBuf {
        let file_name = file_name_directory(mapping);
        if let (Some(known), None) = (known, &file_name) {
            return known.to_path_buf();
        }

        let prefix = self.context_prefix(mapping);
        if let Some(prefix) = &prefix {
            ensure_directory(files, Path::new(CONTEXT_DIR));
            ensure_directory(files, prefix);
        }
        let base = prefix.unwrap_or_default();

        match file_name {
            Some(directory) => {
                let directory = base.join(directory);
                ensure_directory(files, &directory);
                directory.join(named_file(mapping))
            }
            None => base.join(safe_file_name(mapping)),
        }
    }

    /// Path to delete when a mapping is removed. Re-derived from metadata when
    /// `file_name` is set so a lost index entry still finds the file.
    pub fn removal_path(&self, mapping: &Mapping, indexed: Option<&Path>) -> PathBuf {
        let base = self.context_prefix(mapping).unwrap_or_default();
        match (file_name_directory(mapping), indexed) {
            (Some(directory), _) => base.join(directory).join(named_file(mapping)),
            (None, Some(indexed)) => indexed.to_path_buf(),
            (None, None) => base.join(safe_file_name(mapping)),
        }
    }
}

fn ensure_directory<S: FileSource>(files: &S, relative: &Path) {
    if let Err(e) = files.create_directories(relative) {
        warn!("Could not create directory {}: {e}", files.path().join(relative).display());
    }
}

fn file_name_directory(mapping: &Mapping) -> Option<String> {
    contained(mapping, "file_name", mapping.metadata.file_name())
}

/// Keeps `value` only when it is a plain relative path that cannot leave the
/// mappings root.
fn contained(mapping: &Mapping, key: &str, value: Option<String>) -> Option<String> {
    let value = value?;
    let path = Path::new(&value);
    if path.components().all(|component| matches!(component, Component::Normal(_))) {
        Some(value)
    } else {
        warn!("Ignoring {key} {value:?} of mapping {}: not a relative path under the root", mapping.id);
        None
    }
}

fn named_file(mapping: &Mapping) -> String {
    let name = mapping.name.as_deref().filter(|name| !name.is_empty());
    match name {
        Some(name) if is_single_component(name) => format!("{name}.json"),
        Some(name) => {
            warn!("Mapping {} name {name:?} is not a plain file name; using its id", mapping.id);
            format!("{}.json", mapping.id)
        }
        None => {
            warn!("Mapping {} has file_name metadata but no name; using its id", mapping.id);
            format!("{}.json", mapping.id)
        }
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// File name for a mapping without an explicit `file_name` directory:
/// the sanitized name (or URL path) followed by the id.
pub fn safe_file_name(mapping: &Mapping) -> String {
    let suffix = format!("-{}.json", mapping.id);
    if let Some(name) = mapping.name.as_deref().filter(|name| !name.is_empty()) {
        return format!("{}{suffix}", make_safe_name(name));
    }

    match mapping.request.url.pattern.expected() {
        Some(url) => {
            let path = url.split_once('?').map_or(url, |(path, _)| path);
            format!("{}{suffix}", make_safe_name(&path.replace('/', "_")))
        }
        None => format!("{}.json", mapping.id),
    }
}

/// Lower-cased slug with whitespace turned into `-` and characters unsafe in
/// file names turned into `_`.
pub fn make_safe_name(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            c if UNSAFE_CHARS.contains(c) => '_',
            c => c,
        })
        .collect();
    slug.trim_matches('_')
        .chars()
        .take(MAX_SAFE_NAME_LEN)
        .collect::<String>()
        .to_lowercase()
}
