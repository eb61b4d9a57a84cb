//! Read-side listing of registered mappings for the admin API.
//!
//! A listing is scoped to one context: with `context=<C>` it returns the
//! mappings tagged with that context, without it the untagged ones. Derived
//! preflight mappings and mappings that are not file-named are never listed.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::mapping_model::{Mapping, METADATA_CONTEXT};
use crate::registry::MappingRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMappingsQuery {
    pub context: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListMappingsQuery {
    /// Reads `context`, `limit` and `offset` from a raw query string such as
    /// `context=acct&limit=10`. Names and values are percent-decoded, names
    /// ignore case, and unparsable numbers are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        for (name, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            if name.eq_ignore_ascii_case("context") && parsed.context.is_none() {
                parsed.context = Some(value.into_owned());
            } else if name.eq_ignore_ascii_case("limit") {
                parsed.limit = value.parse().ok();
            } else if name.eq_ignore_ascii_case("offset") {
                parsed.offset = value.parse().ok();
            }
        }
        parsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Registered mappings before paging and filtering.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListMappingsResult {
    pub mappings: Vec<Mapping>,
    pub meta: ListMeta,
}

/// Pages through the registry, then keeps the listable mappings of the
/// requested context.
pub fn list_mappings(registry: &dyn MappingRegistry, query: &ListMappingsQuery) -> ListMappingsResult {
    let all = registry.all_mappings();
    let total = all.len();

    let mappings = all
        .into_iter()
        .skip(query.offset.unwrap_or(0))
        .take(query.limit.unwrap_or(usize::MAX))
        .filter(|mapping| in_context(mapping, query.context.as_deref()))
        .filter(is_listable)
        .collect();

    ListMappingsResult { mappings, meta: ListMeta { total } }
}

fn in_context(mapping: &Mapping, context: Option<&str>) -> bool {
    let tagged = mapping.metadata.get_string(METADATA_CONTEXT);
    match context {
        Some(context) => tagged.is_some_and(|tagged| tagged.eq_ignore_ascii_case(context)),
        None => tagged.is_none(),
    }
}

fn is_listable(mapping: &Mapping) -> bool {
    !mapping.request.method.is_options()
        && mapping.name.is_some()
        && mapping.metadata.file_name().is_some()
}
