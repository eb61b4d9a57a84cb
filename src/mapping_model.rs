//! Data model definitions for mock API mappings.
//!
//! A [`Mapping`] pairs a [`RequestPattern`] with a [`ResponseDefinition`] and an
//! open [`Metadata`] table. The JSON shape follows the WireMock mapping format,
//! so files written by other tools load unchanged:
//!
//! ```json
//! {
//!   "id": "3f1c5a0e-8d1e-4c61-9a52-1c8f0b1f9b3e",
//!   "name": "login",
//!   "request": { "method": "GET", "urlPattern": "/api/login.*" },
//!   "response": { "status": 200, "body": "ok" },
//!   "metadata": { "file_name": "auth", "context": "acct" }
//! }
//! ```
//!
//! Fields this crate does not interpret (priorities, scenarios, `jsonBody`,
//! delays, ...) are kept in `extra` maps so they survive a save/load cycle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Metadata key naming the sub-directory a mapping is written into.
pub const METADATA_FILE_NAME: &str = "file_name";
/// Metadata key carrying the lifecycle flag, e.g. `"DISABLED"`.
pub const METADATA_STATUS: &str = "status";
/// Metadata key naming the logical partition of a mapping.
pub const METADATA_CONTEXT: &str = "context";

const DISABLED: &str = "DISABLED";

/// HTTP method a request pattern matches, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestMethod(String);

impl RequestMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_ascii_uppercase())
    }

    pub fn any() -> Self {
        Self::new("ANY")
    }

    pub fn options() -> Self {
        Self::new("OPTIONS")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_options(&self) -> bool {
        self.0.eq_ignore_ascii_case("OPTIONS")
    }
}

impl Default for RequestMethod {
    fn default() -> Self {
        Self::any()
    }
}

/// The value predicate behind a URL rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringValuePattern {
    /// Literal equality.
    EqualTo(String),
    /// Regular expression match.
    Matches(String),
    /// Matches only when the value is missing, which a request URL never is.
    /// Keeps the pattern text it replaced.
    Absent(String),
    /// No URL rule at all.
    Anything,
}

impl StringValuePattern {
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::EqualTo(text) | Self::Matches(text) | Self::Absent(text) => Some(text.as_str()),
            Self::Anything => None,
        }
    }
}

/// URL-matching rule of a request pattern.
///
/// `regex` and `path_only` select the JSON key the rule is stored under:
///
/// | regex | path_only | key              |
/// |-------|-----------|------------------|
/// | false | false     | `url`            |
/// | true  | false     | `urlPattern`     |
/// | false | true      | `urlPath`        |
/// | true  | true      | `urlPathPattern` |
///
/// `template` marks a `urlPathTemplate` rule such as `/items/{id}`; it only
/// combines with `path_only` and never with `regex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UrlFields", into = "UrlFields")]
pub struct UrlPattern {
    pub pattern: StringValuePattern,
    pub regex: bool,
    pub path_only: bool,
    pub template: bool,
}

impl UrlPattern {
    pub fn url(url: impl Into<String>) -> Self {
        Self { pattern: StringValuePattern::EqualTo(url.into()), regex: false, path_only: false, template: false }
    }

    pub fn url_matching(regex: impl Into<String>) -> Self {
        Self { pattern: StringValuePattern::Matches(regex.into()), regex: true, path_only: false, template: false }
    }

    pub fn url_path(path: impl Into<String>) -> Self {
        Self { pattern: StringValuePattern::EqualTo(path.into()), regex: false, path_only: true, template: false }
    }

    pub fn url_path_matching(regex: impl Into<String>) -> Self {
        Self { pattern: StringValuePattern::Matches(regex.into()), regex: true, path_only: true, template: false }
    }

    pub fn url_path_template(template: impl Into<String>) -> Self {
        Self { pattern: StringValuePattern::EqualTo(template.into()), regex: false, path_only: true, template: true }
    }

    pub fn any() -> Self {
        Self { pattern: StringValuePattern::Anything, regex: false, path_only: false, template: false }
    }

    /// False when the rule matches any URL.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self.pattern, StringValuePattern::Anything)
    }
}

impl Default for UrlPattern {
    fn default() -> Self {
        Self::any()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum UrlValue {
    Text(String),
    Absent { absent: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrlFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<UrlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_pattern: Option<UrlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path: Option<UrlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path_pattern: Option<UrlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_path_template: Option<String>,
}

impl From<UrlFields> for UrlPattern {
    fn from(fields: UrlFields) -> Self {
        let candidates = [
            (fields.url, false, false),
            (fields.url_pattern, true, false),
            (fields.url_path, false, true),
            (fields.url_path_pattern, true, true),
        ];
        for (value, regex, path_only) in candidates {
            let pattern = match value {
                Some(UrlValue::Text(text)) if regex => StringValuePattern::Matches(text),
                Some(UrlValue::Text(text)) => StringValuePattern::EqualTo(text),
                Some(UrlValue::Absent { absent }) => StringValuePattern::Absent(absent),
                None => continue,
            };
            return Self { pattern, regex, path_only, template: false };
        }
        match fields.url_path_template {
            Some(template) => Self::url_path_template(template),
            None => Self::any(),
        }
    }
}

impl From<UrlPattern> for UrlFields {
    fn from(url: UrlPattern) -> Self {
        let value = match url.pattern {
            StringValuePattern::EqualTo(text) | StringValuePattern::Matches(text) => UrlValue::Text(text),
            StringValuePattern::Absent(absent) => UrlValue::Absent { absent },
            StringValuePattern::Anything => return Self::default(),
        };
        let mut fields = Self::default();
        if url.template {
            fields.url_path_template = value_text(value);
            return fields;
        }
        let slot = match (url.regex, url.path_only) {
            (false, false) => &mut fields.url,
            (true, false) => &mut fields.url_pattern,
            (false, true) => &mut fields.url_path,
            (true, true) => &mut fields.url_path_pattern,
        };
        *slot = Some(value);
        fields
    }
}

fn value_text(value: UrlValue) -> Option<String> {
    match value {
        UrlValue::Text(text) => Some(text),
        UrlValue::Absent { absent } => Some(absent),
    }
}

/// Request side of a mapping. Everything except the method and URL rule is
/// opaque to this crate and carried as raw JSON; predicates without a named
/// field (`host`, `scheme`, `formParameters`, ...) land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    #[serde(default)]
    pub method: RequestMethod,
    #[serde(flatten)]
    pub url: UrlPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth_credentials: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_patterns: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipart_patterns: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_matcher: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A header value as written in mapping files: one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

/// Response headers in file order. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HttpHeaders(IndexMap<String, HeaderValue>);

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HeaderValue)> {
        self.0.iter()
    }
}

fn default_status() -> u16 {
    200
}

/// Response side of a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_body: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_body: Option<String>,
    #[serde(default, skip_serializing_if = "HttpHeaders::is_empty")]
    pub headers: HttpHeaders,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Default for ResponseDefinition {
    fn default() -> Self {
        Self {
            status: default_status(),
            status_message: None,
            body: None,
            json_body: None,
            base64_body: None,
            headers: HttpHeaders::new(),
            extra: Map::new(),
        }
    }
}

impl ResponseDefinition {
    /// Drops every inline body representation and leaves an empty text body.
    pub fn clear_body(&mut self) {
        self.body = Some(String::new());
        self.json_body = None;
        self.base64_body = None;
    }
}

/// Open string-keyed metadata attached to a mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, JsonValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// String form of a value; non-string values use their JSON text and
    /// `null` counts as missing.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            JsonValue::Null => None,
            JsonValue::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn file_name(&self) -> Option<String> {
        self.get_string(METADATA_FILE_NAME).filter(|name| !name.is_empty())
    }

    pub fn context(&self) -> Option<String> {
        self.get_string(METADATA_CONTEXT).filter(|context| !context.is_empty())
    }

    pub fn is_disabled(&self) -> bool {
        self.get_string(METADATA_STATUS)
            .is_some_and(|status| status.eq_ignore_ascii_case(DISABLED))
    }
}

/// A persisted request-match plus response record.
///
/// `dirty` is never written to disk; it is set by whoever edits the mapping in
/// memory and cleared by the store once the mapping is saved or loaded.
///
/// ```rust
/// use mock_mappings_core::mapping_model::{Mapping, RequestMethod, UrlPattern};
///
/// let mapping = Mapping::new(RequestMethod::new("get"), UrlPattern::url("/api/login"))
///     .with_name("login")
///     .with_metadata("file_name", "auth");
///
/// assert_eq!(mapping.request.method.as_str(), "GET");
/// assert_eq!(mapping.metadata.file_name().as_deref(), Some("auth"));
/// assert!(mapping.dirty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub request: RequestPattern,
    #[serde(default)]
    pub response: ResponseDefinition,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
    #[serde(skip)]
    pub dirty: bool,
}

impl Mapping {
    /// A fresh in-memory mapping, marked dirty.
    pub fn new(method: RequestMethod, url: UrlPattern) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            request: RequestPattern { method, url, ..RequestPattern::default() },
            response: ResponseDefinition::default(),
            metadata: Metadata::new(),
            extra: Map::new(),
            dirty: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.response.status = status;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.response.body = Some(body.into());
        self
    }

    pub fn with_response_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.response.headers.insert(name, value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

#[derive(Deserialize)]
struct MappingCollection {
    mappings: Vec<Mapping>,
}

#[derive(Serialize)]
struct MappingCollectionRef<'a> {
    mappings: &'a [Mapping],
}

/// Contents of one mapping file: a single mapping or a `{"mappings": [...]}`
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingFile {
    Single(Mapping),
    Collection(Vec<Mapping>),
}

impl MappingFile {
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let value: JsonValue = serde_json::from_str(contents)?;
        if value.get("mappings").is_some() {
            let collection: MappingCollection = serde_json::from_value(value)?;
            Ok(Self::Collection(collection.mappings))
        } else {
            Ok(Self::Single(serde_json::from_value(value)?))
        }
    }

    /// Pretty JSON in the same shape [`MappingFile::parse`] reads.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Single(mapping) => serde_json::to_string_pretty(mapping),
            Self::Collection(mappings) => serde_json::to_string_pretty(&MappingCollectionRef { mappings }),
        }
    }

    pub fn into_mappings(self) -> Vec<Mapping> {
        match self {
            Self::Single(mapping) => vec![mapping],
            Self::Collection(mappings) => mappings,
        }
    }
}
