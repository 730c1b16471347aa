// crates/contract-probe-core/src/spec.rs
// ============================================================================
// Module: API Specification
// Description: Immutable model of an OpenAPI 3.0 contract document.
// Purpose: Load an API document once and index its operations by template.
// Dependencies: serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! An [`ApiSpecification`] is parsed from a YAML or JSON OpenAPI 3.0 document
//! and indexed by `(method, path template)`. Each [`Operation`] keeps its
//! declared responses keyed by exact status, status class (`4XX`), or
//! `default`; each response keeps its media types, body schema, examples, and
//! response headers.
//! Invariants:
//! - The model is built once and exposes read-only accessors only.
//! - Operations are looked up by template (`/pets/{petId}`), never by a
//!   concrete request path.
//! - Response `$ref`s are resolved at load time; schema `$ref`s stay in place
//!   and resolve against [`ApiSpecification::components`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix every local response reference must carry.
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading an API specification document.
///
/// # Invariants
/// - Variants are stable for load failure classification.
#[derive(Debug, Error)]
pub enum SpecificationLoadError {
    /// The resolved document path does not exist.
    #[error("api specification not found: {}", .0.display())]
    Missing(PathBuf),
    /// The document exists but could not be read.
    #[error("api specification unreadable: {}: {source}", .path.display())]
    Io {
        /// Resolved document path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The document is not valid YAML/JSON or does not match the OpenAPI shape.
    #[error("api specification unparsable: {source_name}: {message}")]
    Parse {
        /// Source label (path or caller-provided name).
        source_name: String,
        /// Parser message.
        message: String,
    },
    /// The document parsed but violates a structural rule.
    #[error("api specification invalid: {source_name}: {message}")]
    Invalid {
        /// Source label (path or caller-provided name).
        source_name: String,
        /// Violation description.
        message: String,
    },
    /// A response body schema failed to compile.
    #[error("api specification schema invalid: {operation} {response}: {message}")]
    Schema {
        /// Operation the schema belongs to.
        operation: String,
        /// Response key the schema belongs to.
        response: String,
        /// Compiler message.
        message: String,
    },
}

// ============================================================================
// SECTION: HTTP Methods
// ============================================================================

/// HTTP methods an OpenAPI path item may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Returns the canonical upper-case method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            "HEAD" => Ok(Self::Head),
            "PATCH" => Ok(Self::Patch),
            "TRACE" => Ok(Self::Trace),
            _ => Err(format!("unsupported http method: {raw}")),
        }
    }
}

// ============================================================================
// SECTION: Model Types
// ============================================================================

/// Identity of an operation: method plus path template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationKey {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template with placeholders, e.g. `/pets/{petId}`.
    pub template: String,
}

impl OperationKey {
    /// Creates an operation key.
    #[must_use]
    pub fn new(method: HttpMethod, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)
    }
}

/// Key of a declared response.
///
/// # Invariants
/// - Ordering is exact status, then status class, then `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseKey {
    /// Exact status code (`200`).
    Status(u16),
    /// Status class (`4XX`), stored as the leading digit.
    Range(u8),
    /// The `default` response.
    Default,
}

impl ResponseKey {
    /// Parses an OpenAPI response key.
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            return Some(Self::Default);
        }
        let bytes = trimmed.as_bytes();
        if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"xx") {
            let class = bytes[0].checked_sub(b'0')?;
            return (1..=5).contains(&class).then_some(Self::Range(class));
        }
        let code: u16 = trimmed.parse().ok()?;
        (100..=599).contains(&code).then_some(Self::Status(code))
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Range(class) => write!(f, "{class}XX"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Declared media type of a response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaSpec {
    /// Body schema (OpenAPI schema object, `nullable` normalized).
    pub schema: Option<Value>,
    /// Single inline example.
    pub example: Option<Value>,
    /// Named examples.
    pub examples: BTreeMap<String, Value>,
}

impl MediaSpec {
    /// Returns the named example, or the default example when no name is given
    /// or the name is unknown.
    #[must_use]
    pub fn example(&self, name: Option<&str>) -> Option<&Value> {
        if let Some(value) = name.and_then(|name| self.examples.get(name)) {
            return Some(value);
        }
        self.example.as_ref().or_else(|| self.examples.values().next())
    }
}

/// Declared response header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderSpec {
    /// Whether the header must be present.
    pub required: bool,
    /// Header value schema, when declared.
    pub schema: Option<Value>,
}

/// Declared response for one status key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseSpec {
    /// Human-readable description.
    pub description: String,
    /// Media types keyed by normalized content type.
    pub content: BTreeMap<String, MediaSpec>,
    /// Headers keyed by lower-cased name.
    pub headers: BTreeMap<String, HeaderSpec>,
}

impl ResponseSpec {
    /// Finds the media entry matching a response content type.
    ///
    /// Matching order: exact type, then `type/*`, then `*/*`. Parameters such
    /// as `charset` are ignored.
    #[must_use]
    pub fn media(&self, content_type: &str) -> Option<(&str, &MediaSpec)> {
        let normalized = normalize_media_type(content_type);
        if let Some((key, media)) = self.content.get_key_value(&normalized) {
            return Some((key.as_str(), media));
        }
        let wildcard = normalized
            .split_once('/')
            .map(|(kind, _)| format!("{kind}/*"))
            .unwrap_or_default();
        self.content
            .get_key_value(&wildcard)
            .or_else(|| self.content.get_key_value("*/*"))
            .map(|(key, media)| (key.as_str(), media))
    }

    /// Returns true when any declared media type carries a body schema.
    #[must_use]
    pub fn declares_body_schema(&self) -> bool {
        self.content.values().any(|media| media.schema.is_some())
    }
}

/// A single operation of the specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Method plus path template.
    pub key: OperationKey,
    /// Optional `operationId`.
    pub operation_id: Option<String>,
    /// Declared responses.
    pub responses: BTreeMap<ResponseKey, ResponseSpec>,
}

impl Operation {
    /// Resolves the response declared for a status: exact code, then status
    /// class, then `default`.
    #[must_use]
    pub fn response(&self, status: u16) -> Option<(ResponseKey, &ResponseSpec)> {
        let class = u8::try_from(status / 100).ok();
        let candidates = [
            Some(ResponseKey::Status(status)),
            class.map(ResponseKey::Range),
            Some(ResponseKey::Default),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(|key| self.responses.get(&key).map(|response| (key, response)))
    }

    /// Returns the lowest declared 2xx status, if any.
    #[must_use]
    pub fn lowest_success(&self) -> Option<u16> {
        self.responses.keys().find_map(|key| match key {
            ResponseKey::Status(code) if (200..300).contains(code) => Some(*code),
            _ => None,
        })
    }
}

/// Parsed, immutable OpenAPI document.
///
/// # Invariants
/// - Constructed once per document; no mutating accessors exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSpecification {
    /// Source label (resolved path or caller-provided name).
    source: String,
    /// Declared `openapi` version string.
    version: String,
    /// Operations keyed by method plus template.
    operations: BTreeMap<OperationKey, Operation>,
    /// Document components used to resolve schema references.
    components: Value,
}

impl ApiSpecification {
    /// Loads a document located at `relative` under `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationLoadError`] when the document is missing,
    /// unreadable, unparsable, or structurally invalid.
    pub fn load(project_root: &Path, relative: &str) -> Result<Self, SpecificationLoadError> {
        let path = project_root.join(relative);
        if !path.is_file() {
            return Err(SpecificationLoadError::Missing(path));
        }
        let text = fs::read_to_string(&path).map_err(|source| SpecificationLoadError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parses a YAML or JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationLoadError`] when the text is not an OpenAPI 3.x
    /// document or references undeclared components.
    pub fn parse(source_name: &str, text: &str) -> Result<Self, SpecificationLoadError> {
        let document: OpenApiDocument =
            serde_yaml::from_str(text).map_err(|err| SpecificationLoadError::Parse {
                source_name: source_name.to_string(),
                message: err.to_string(),
            })?;
        let invalid = |message: String| SpecificationLoadError::Invalid {
            source_name: source_name.to_string(),
            message,
        };
        if !document.openapi.trim().starts_with("3.") {
            return Err(invalid(format!("unsupported openapi version: {}", document.openapi)));
        }

        let mut operations = BTreeMap::new();
        for (template, item) in document.paths {
            if !template.starts_with('/') {
                return Err(invalid(format!("path template must start with '/': {template}")));
            }
            for (method, operation) in item.into_operations() {
                let key = OperationKey::new(method, template.clone());
                let responses =
                    build_responses(&key, operation.responses, &document.components.responses)
                        .map_err(invalid)?;
                operations.insert(
                    key.clone(),
                    Operation {
                        key,
                        operation_id: operation.operation_id,
                        responses,
                    },
                );
            }
        }

        let mut schemas = document.components.schemas;
        for schema in schemas.values_mut() {
            normalize_nullable(schema);
        }
        let mut components = Map::new();
        components.insert("schemas".to_string(), Value::Object(schemas));

        Ok(Self {
            source: source_name.to_string(),
            version: document.openapi,
            operations,
            components: Value::Object(components),
        })
    }

    /// Returns the source label the document was loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the declared `openapi` version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Looks up an operation by exact method and template.
    #[must_use]
    pub fn operation(&self, method: HttpMethod, template: &str) -> Option<&Operation> {
        self.operations.get(&OperationKey::new(method, template))
    }

    /// Iterates every operation in key order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Returns the components object (`{"schemas": {...}}`).
    #[must_use]
    pub const fn components(&self) -> &Value {
        &self.components
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lower-cases a content type and strips parameters.
#[must_use]
pub fn normalize_media_type(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Converts document responses into the indexed model.
fn build_responses(
    key: &OperationKey,
    entries: BTreeMap<String, ResponseEntry>,
    shared: &BTreeMap<String, ResponseDocument>,
) -> Result<BTreeMap<ResponseKey, ResponseSpec>, String> {
    let mut responses = BTreeMap::new();
    for (raw_key, entry) in entries {
        let response_key = ResponseKey::parse(&raw_key)
            .ok_or_else(|| format!("{key}: invalid response key: {raw_key}"))?;
        let document = match entry {
            ResponseEntry::Inline(document) => document,
            ResponseEntry::Reference {
                reference,
            } => {
                let name = reference
                    .strip_prefix(RESPONSE_REF_PREFIX)
                    .ok_or_else(|| format!("{key}: unsupported response reference: {reference}"))?;
                shared
                    .get(name)
                    .cloned()
                    .ok_or_else(|| format!("{key}: unresolved response reference: {reference}"))?
            }
        };
        responses.insert(response_key, document.into_spec());
    }
    Ok(responses)
}

/// Rewrites OpenAPI `nullable: true` into a JSON-Schema `null` type alternative.
fn normalize_nullable(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let nullable = map.remove("nullable").and_then(|flag| flag.as_bool()).unwrap_or(false);
            if nullable {
                let widened = match map.get("type") {
                    Some(Value::String(kind)) => {
                        Some(Value::Array(vec![Value::String(kind.clone()), Value::from("null")]))
                    }
                    Some(Value::Array(kinds)) if !kinds.iter().any(|kind| kind == "null") => {
                        let mut kinds = kinds.clone();
                        kinds.push(Value::from("null"));
                        Some(Value::Array(kinds))
                    }
                    _ => None,
                };
                if let Some(widened) = widened {
                    map.insert("type".to_string(), widened);
                }
                if let Some(Value::Array(allowed)) = map.get_mut("enum")
                    && !allowed.contains(&Value::Null)
                {
                    allowed.push(Value::Null);
                }
            }
            for child in map.values_mut() {
                normalize_nullable(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                normalize_nullable(child);
            }
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Document Shape
// ============================================================================

/// Subset of the OpenAPI document shape the harness consumes.
#[derive(Debug, Deserialize)]
struct OpenApiDocument {
    /// Declared OpenAPI version.
    openapi: String,
    /// Path items keyed by template.
    #[serde(default)]
    paths: BTreeMap<String, PathItemDocument>,
    /// Shared components.
    #[serde(default)]
    components: ComponentsDocument,
}

/// Shared components section.
#[derive(Debug, Default, Deserialize)]
struct ComponentsDocument {
    /// Named schemas.
    #[serde(default)]
    schemas: Map<String, Value>,
    /// Named responses.
    #[serde(default)]
    responses: BTreeMap<String, ResponseDocument>,
}

/// One path item with its per-method operations.
#[derive(Debug, Default, Deserialize)]
struct PathItemDocument {
    /// `get` operation.
    get: Option<OperationDocument>,
    /// `put` operation.
    put: Option<OperationDocument>,
    /// `post` operation.
    post: Option<OperationDocument>,
    /// `delete` operation.
    delete: Option<OperationDocument>,
    /// `options` operation.
    options: Option<OperationDocument>,
    /// `head` operation.
    head: Option<OperationDocument>,
    /// `patch` operation.
    patch: Option<OperationDocument>,
    /// `trace` operation.
    trace: Option<OperationDocument>,
}

impl PathItemDocument {
    /// Flattens the declared operations with their methods.
    fn into_operations(self) -> Vec<(HttpMethod, OperationDocument)> {
        [
            (HttpMethod::Get, self.get),
            (HttpMethod::Put, self.put),
            (HttpMethod::Post, self.post),
            (HttpMethod::Delete, self.delete),
            (HttpMethod::Options, self.options),
            (HttpMethod::Head, self.head),
            (HttpMethod::Patch, self.patch),
            (HttpMethod::Trace, self.trace),
        ]
        .into_iter()
        .filter_map(|(method, operation)| operation.map(|operation| (method, operation)))
        .collect()
    }
}

/// One operation object.
#[derive(Debug, Deserialize)]
struct OperationDocument {
    /// Optional operation identifier.
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    /// Responses keyed by status key.
    #[serde(default)]
    responses: BTreeMap<String, ResponseEntry>,
}

/// A response entry: either a local reference or an inline response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseEntry {
    /// `$ref` to `#/components/responses/*`.
    Reference {
        /// Reference target.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline response object.
    Inline(ResponseDocument),
}

/// Response object.
#[derive(Debug, Clone, Default, Deserialize)]
struct ResponseDocument {
    /// Description text.
    #[serde(default)]
    description: String,
    /// Media types keyed by content type.
    #[serde(default)]
    content: BTreeMap<String, MediaTypeDocument>,
    /// Response headers keyed by name.
    #[serde(default)]
    headers: BTreeMap<String, HeaderDocument>,
}

impl ResponseDocument {
    /// Converts the document shape into the normalized model.
    fn into_spec(self) -> ResponseSpec {
        let content = self
            .content
            .into_iter()
            .map(|(content_type, media)| (normalize_media_type(&content_type), media.into_spec()))
            .collect();
        let headers = self
            .headers
            .into_iter()
            .map(|(name, header)| {
                (
                    name.to_ascii_lowercase(),
                    HeaderSpec {
                        required: header.required,
                        schema: header.schema,
                    },
                )
            })
            .collect();
        ResponseSpec {
            description: self.description,
            content,
            headers,
        }
    }
}

/// Media type object.
#[derive(Debug, Clone, Default, Deserialize)]
struct MediaTypeDocument {
    /// Body schema.
    schema: Option<Value>,
    /// Inline example.
    example: Option<Value>,
    /// Named examples.
    #[serde(default)]
    examples: BTreeMap<String, ExampleDocument>,
}

impl MediaTypeDocument {
    /// Converts the document shape into the normalized model.
    fn into_spec(self) -> MediaSpec {
        let schema = self.schema.map(|mut schema| {
            normalize_nullable(&mut schema);
            schema
        });
        let examples = self
            .examples
            .into_iter()
            .filter_map(|(name, example)| example.value.map(|value| (name, value)))
            .collect();
        MediaSpec {
            schema,
            example: self.example,
            examples,
        }
    }
}

/// Named example object.
#[derive(Debug, Clone, Default, Deserialize)]
struct ExampleDocument {
    /// Example payload.
    value: Option<Value>,
}

/// Header object.
#[derive(Debug, Clone, Default, Deserialize)]
struct HeaderDocument {
    /// Whether the header is required.
    #[serde(default)]
    required: bool,
    /// Header schema.
    schema: Option<Value>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
