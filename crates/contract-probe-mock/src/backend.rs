// crates/contract-probe-mock/src/backend.rs
// ============================================================================
// Module: Mock Backend
// Description: Response selection over the examples of an OpenAPI document.
// Purpose: Answer requests with declared responses, steered by `Prefer` hints.
// Dependencies: contract-probe-core, serde_json
// ============================================================================

//! ## Overview
//! [`MockBackend::respond`] maps `(method, concrete path, Prefer)` to a
//! [`MockResponse`] without touching the network, so the selection rules are
//! testable on their own:
//! - the path is matched segment-wise against the document's templates,
//!   preferring the template with the most literal segments;
//! - `Prefer: code=N` selects the response declared for `N`; without a hint the
//!   lowest declared 2xx is used;
//! - the body is the named example, else the default example, else a sample
//!   derived from the schema.
//! Invariants:
//! - Requests are never validated; the mock only replays the contract.
//! - The `Prefer` header is consumed and never echoed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use contract_probe_core::ApiSpecification;
use contract_probe_core::HttpMethod;
use contract_probe_core::Operation;
use contract_probe_core::ResponseSpec;
use contract_probe_core::ScenarioHint;
use serde_json::Value;
use serde_json::json;

use crate::sample::sample_from_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type used for mock-generated error bodies.
const JSON: &str = "application/json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Response produced by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    /// Status code to send.
    pub status: u16,
    /// Content type of the body, when one is sent.
    pub content_type: Option<String>,
    /// JSON body, when one is sent.
    pub body: Option<Value>,
}

impl MockResponse {
    /// Builds a mock-level error response (`{"code", "message"}`).
    fn error(status: u16, code: &str, message: String) -> Self {
        Self {
            status,
            content_type: Some(JSON.to_string()),
            body: Some(json!({ "code": code, "message": message })),
        }
    }
}

/// Serves the declared responses of one specification.
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Shared specification document.
    specification: Arc<ApiSpecification>,
}

impl MockBackend {
    /// Creates a backend over `specification`.
    #[must_use]
    pub const fn new(specification: Arc<ApiSpecification>) -> Self {
        Self {
            specification,
        }
    }

    /// Returns the served specification.
    #[must_use]
    pub const fn specification(&self) -> &Arc<ApiSpecification> {
        &self.specification
    }

    /// Selects the response for a request.
    #[must_use]
    pub fn respond(&self, method: HttpMethod, path: &str, prefer: Option<&str>) -> MockResponse {
        let Some(operation) = self.route(method, path) else {
            return MockResponse::error(
                404,
                "MOCK_ROUTE_NOT_FOUND",
                format!("no operation declared for {method} {path}"),
            );
        };
        let hint = match prefer.map(str::parse::<ScenarioHint>).transpose() {
            Ok(hint) => hint,
            Err(err) => return MockResponse::error(400, "MOCK_INVALID_PREFER", err.to_string()),
        };
        let status = match &hint {
            Some(hint) => hint.code(),
            None => match operation.lowest_success() {
                Some(status) => status,
                None => {
                    return MockResponse::error(
                        500,
                        "MOCK_NO_RESPONSE",
                        format!("{} declares no success response", operation.key),
                    );
                }
            },
        };
        let Some((_, response)) = operation.response(status) else {
            return MockResponse::error(
                500,
                "MOCK_NO_RESPONSE",
                format!("{} declares no response for status {status}", operation.key),
            );
        };
        self.render(status, response, hint.as_ref().and_then(ScenarioHint::example))
    }

    /// Finds the operation whose template matches `path`.
    fn route(&self, method: HttpMethod, path: &str) -> Option<&Operation> {
        let segments = split_path(path);
        self.specification
            .operations()
            .filter(|operation| operation.key.method == method)
            .filter_map(|operation| {
                template_score(&operation.key.template, &segments).map(|score| (score, operation))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, operation)| operation)
    }

    /// Renders a declared response with the chosen example.
    fn render(&self, status: u16, response: &ResponseSpec, example: Option<&str>) -> MockResponse {
        let Some((media_type, media)) = response
            .content
            .get_key_value(JSON)
            .or_else(|| response.content.iter().next())
        else {
            return MockResponse {
                status,
                content_type: None,
                body: None,
            };
        };
        let body = media.example(example).cloned().or_else(|| {
            media
                .schema
                .as_ref()
                .map(|schema| sample_from_schema(schema, self.specification.components()))
        });
        let content_type = if media_type.contains('*') { JSON } else { media_type.as_str() };
        MockResponse {
            status,
            content_type: body.as_ref().map(|_| content_type.to_string()),
            body,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a path into non-empty segments.
fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Returns the number of literal segments when `template` matches `segments`.
fn template_score(template: &str, segments: &[&str]) -> Option<usize> {
    let parts = split_path(template);
    if parts.len() != segments.len() {
        return None;
    }
    let mut literals = 0;
    for (part, segment) in parts.iter().zip(segments) {
        if part.starts_with('{') && part.ends_with('}') {
            continue;
        }
        if part != segment {
            return None;
        }
        literals += 1;
    }
    Some(literals)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
