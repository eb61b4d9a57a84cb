//! In-memory disabling of mappings through `status: DISABLED` metadata.

use std::mem;

use log::debug;

use crate::mapping_model::{Mapping, StringValuePattern};

/// Swaps the regex URL predicate of a disabled mapping for an absent
/// predicate carrying the same pattern text, so the matching engine can no
/// longer reach it. Returns whether the mapping changed.
///
/// Literal URL rules (`url`, `urlPath`) are left alone and stay matchable.
pub fn rewrite(mapping: &mut Mapping) -> bool {
    if !mapping.metadata.is_disabled() {
        return false;
    }

    let url = &mut mapping.request.url;
    match mem::replace(&mut url.pattern, StringValuePattern::Anything) {
        StringValuePattern::Matches(regex) => {
            debug!("Disabling mapping {} (url pattern {regex})", mapping.id);
            url.pattern = StringValuePattern::Absent(regex);
            true
        }
        other => {
            url.pattern = other;
            false
        }
    }
}
