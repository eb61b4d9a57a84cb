//! CORS preflight derivation.

use uuid::Uuid;

use crate::headers::HeaderAugmenter;
use crate::mapping_model::{Mapping, RequestMethod};

const PREFLIGHT_STATUS: u16 = 200;

/// Builds the OPTIONS sibling of a mapping: same URL rule and request
/// predicates, empty 200 response with the default headers, new identity.
#[derive(Debug, Clone, Default)]
pub struct PreflightSynthesizer {
    headers: HeaderAugmenter,
}

impl PreflightSynthesizer {
    pub fn new(headers: HeaderAugmenter) -> Self {
        Self { headers }
    }

    pub fn synthesize(&self, source: &Mapping) -> Mapping {
        let mut derived = source.clone();
        derived.id = Uuid::new_v4();
        // A copied legacy `uuid` field would alias the source.
        derived.extra.remove("uuid");
        derived.request.method = RequestMethod::options();
        derived.response.clear_body();
        derived.response.status = PREFLIGHT_STATUS;
        derived.response = self.headers.augment(derived.response);
        derived.dirty = false;
        derived
    }
}
