//! Default response headers.

use crate::config::CorsHeaders;
use crate::mapping_model::ResponseDefinition;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

/// Merges a fixed header table into responses. A header the response already
/// defines is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAugmenter {
    defaults: Vec<(String, String)>,
}

impl HeaderAugmenter {
    pub fn new(cors: &CorsHeaders) -> Self {
        Self {
            defaults: vec![
                (ALLOW_ORIGIN.to_string(), cors.allow_origin.clone()),
                (ALLOW_METHODS.to_string(), cors.allow_methods.clone()),
                (ALLOW_HEADERS.to_string(), cors.allow_headers.join(",")),
            ],
        }
    }

    pub fn defaults(&self) -> &[(String, String)] {
        &self.defaults
    }

    pub fn augment(&self, mut response: ResponseDefinition) -> ResponseDefinition {
        for (name, value) in &self.defaults {
            if !response.headers.contains(name) {
                response.headers.insert(name.clone(), value.clone());
            }
        }
        response
    }
}

impl Default for HeaderAugmenter {
    fn default() -> Self {
        Self::new(&CorsHeaders::default())
    }
}
