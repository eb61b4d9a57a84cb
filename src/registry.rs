//! In-memory mapping registry consumed by the request-matching engine.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::mapping_model::Mapping;

/// The live set of mappings the matching engine serves from.
///
/// `add_mapping` is an upsert keyed by mapping id.
pub trait MappingRegistry: Send + Sync {
    fn add_mapping(&self, mapping: Mapping);

    fn remove_mapping(&self, id: &Uuid) -> Option<Mapping>;

    fn get_mapping(&self, id: &Uuid) -> Option<Mapping>;

    /// All mappings in registration order.
    fn all_mappings(&self) -> Vec<Mapping>;
}

/// Registry kept in an insertion-ordered map behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    mappings: RwLock<IndexMap<Uuid, Mapping>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<Uuid, Mapping>> {
        self.mappings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<Uuid, Mapping>> {
        self.mappings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MappingRegistry for InMemoryRegistry {
    fn add_mapping(&self, mapping: Mapping) {
        self.write().insert(mapping.id, mapping);
    }

    fn remove_mapping(&self, id: &Uuid) -> Option<Mapping> {
        self.write().shift_remove(id)
    }

    fn get_mapping(&self, id: &Uuid) -> Option<Mapping> {
        self.read().get(id).cloned()
    }

    fn all_mappings(&self) -> Vec<Mapping> {
        self.read().values().cloned().collect()
    }
}
