// crates/contract-probe-core/src/interaction.rs
// ============================================================================
// Module: HTTP Interaction
// Description: Captured request/response tuple handed to the contract validator.
// Purpose: Keep the concrete request path and the lookup template side by side.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! An [`HttpInteraction`] records what was sent (method, concrete path) and
//! what came back (status, body text, content type, headers), together with
//! the path template the specification is indexed by. The concrete path is
//! used for sending; the template is used for validation. Neither is ever
//! derived from the other.
//!
//! The `expect_*` helpers are the scenario-level assertions (status codes and
//! JSON body fields) a test applies before handing the interaction to the
//! validator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::scenario::ScenarioError;
use crate::spec::HttpMethod;

// ============================================================================
// SECTION: Interaction
// ============================================================================

/// A captured HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpInteraction {
    /// Request method.
    method: HttpMethod,
    /// Concrete request path (`/pets/999999`).
    request_path: String,
    /// Template used for specification lookup (`/pets/{petId}`).
    path_template: String,
    /// Response status code.
    status: u16,
    /// Response body as text (possibly empty).
    body: String,
    /// Response content type, when present.
    content_type: Option<String>,
    /// Response headers keyed by lower-cased name.
    headers: BTreeMap<String, String>,
}

impl HttpInteraction {
    /// Creates an interaction for `method` and `path_template` with an empty body.
    ///
    /// The concrete request path defaults to the template; set it with
    /// [`HttpInteraction::with_request_path`] when they differ.
    #[must_use]
    pub fn new(method: HttpMethod, path_template: impl Into<String>, status: u16) -> Self {
        let path_template = path_template.into();
        Self {
            method,
            request_path: path_template.clone(),
            path_template,
            status,
            body: String::new(),
            content_type: None,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the concrete request path.
    #[must_use]
    pub fn with_request_path(mut self, request_path: impl Into<String>) -> Self {
        self.request_path = request_path.into();
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the response content type (also recorded as a header).
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.headers.insert("content-type".to_string(), content_type.clone());
        self.content_type = Some(content_type);
        self
    }

    /// Adds a response header; the name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the concrete request path.
    #[must_use]
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// Returns the lookup template.
    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the response content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the response headers keyed by lower-cased name.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns a response header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    // ------------------------------------------------------------------------
    // Expectations
    // ------------------------------------------------------------------------

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the body is not valid JSON.
    pub fn json_body(&self) -> Result<Value, ScenarioError> {
        serde_json::from_str(&self.body).map_err(|err| {
            self.expectation(format!("response body is not valid JSON: {err}"))
        })
    }

    /// Returns the JSON value at a dotted field path (`code`, `owner.name`).
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the body is not valid JSON.
    pub fn field(&self, path: &str) -> Result<Option<Value>, ScenarioError> {
        let body = self.json_body()?;
        let mut current = &body;
        for segment in path.split('.').filter(|segment| !segment.is_empty()) {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    /// Checks the status code.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the status differs.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, ScenarioError> {
        if self.status == expected {
            return Ok(self);
        }
        Err(self.expectation(format!("expected status {expected}, got {}", self.status)))
    }

    /// Checks the status code is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the status is not listed.
    pub fn expect_status_in(&self, allowed: &[u16]) -> Result<&Self, ScenarioError> {
        if allowed.contains(&self.status) {
            return Ok(self);
        }
        let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        Err(self.expectation(format!(
            "expected status in [{}], got {}",
            listed.join(", "),
            self.status
        )))
    }

    /// Checks the body is non-empty JSON other than `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the body is empty or `null`.
    pub fn expect_non_null_body(&self) -> Result<&Self, ScenarioError> {
        if self.json_body()?.is_null() {
            return Err(self.expectation("expected a non-null JSON body".to_string()));
        }
        Ok(self)
    }

    /// Checks a body field is present and not `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the field is absent or `null`.
    pub fn expect_field_present(&self, path: &str) -> Result<&Self, ScenarioError> {
        match self.field(path)? {
            Some(value) if !value.is_null() => Ok(self),
            _ => Err(self.expectation(format!("expected body field `{path}` to be present"))),
        }
    }

    /// Checks a body field equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Expectation`] when the field is absent or differs.
    pub fn expect_field_eq(
        &self,
        path: &str,
        expected: impl Into<Value>,
    ) -> Result<&Self, ScenarioError> {
        let expected = expected.into();
        match self.field(path)? {
            Some(actual) if actual == expected => Ok(self),
            Some(actual) => Err(self.expectation(format!(
                "expected body field `{path}` == {expected}, got {actual}"
            ))),
            None => Err(self.expectation(format!("expected body field `{path}` == {expected}, got nothing"))),
        }
    }

    /// Builds an expectation error prefixed with the request line.
    fn expectation(&self, detail: String) -> ScenarioError {
        ScenarioError::Expectation(format!("{} {}: {detail}", self.method, self.request_path))
    }
}
