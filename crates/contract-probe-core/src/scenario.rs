// crates/contract-probe-core/src/scenario.rs
// ============================================================================
// Module: Scenario Client
// Description: Single-shot HTTP requests with optional `Prefer` hints.
// Purpose: Capture interactions and hand them to the contract validator.
// Dependencies: reqwest, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! A [`ScenarioRequest`] describes one crafted request: the concrete path to
//! send, the template to validate against, query pairs, an optional JSON body,
//! and an optional [`ScenarioHint`]. [`ScenarioClient::send`] issues it exactly
//! once and captures the response as an [`HttpInteraction`];
//! [`ScenarioContext::run`] additionally validates the interaction and fails on
//! the first non-empty report.
//! Invariants:
//! - Requests are never retried; transport failures surface immediately.
//! - The `Prefer` header is attached only when a hint is set.
//! - Redirects are never followed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::audit::ContractValidationEvent;
use crate::audit::HarnessAuditSink;
use crate::audit::ScenarioRequestEvent;
use crate::audit::ScenarioRequestEventParams;
use crate::error::ContractViolation;
use crate::error::HarnessError;
use crate::hint::PREFER_HEADER;
use crate::hint::ScenarioHint;
use crate::interaction::HttpInteraction;
use crate::spec::HttpMethod;
use crate::validator::ContractValidator;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario request and expectation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// No HTTP response was received.
    #[error("unexpected transport error: {0}")]
    Transport(String),
    /// A scenario-level expectation did not hold.
    #[error("scenario expectation failed: {0}")]
    Expectation(String),
    /// The request could not be built.
    #[error("invalid scenario request: {0}")]
    InvalidRequest(String),
}

// ============================================================================
// SECTION: Request
// ============================================================================

/// One crafted request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Concrete path sent on the wire.
    pub path: String,
    /// Template used for validation.
    pub path_template: String,
    /// Query pairs appended in order.
    pub query: Vec<(String, String)>,
    /// Optional JSON request body.
    pub body: Option<Value>,
    /// Optional mock steering hint.
    pub hint: Option<ScenarioHint>,
    /// `Accept` header value.
    pub accept: String,
}

impl ScenarioRequest {
    /// Creates a request for `path`, validated against `path_template`.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_template: path_template.into(),
            query: Vec::new(),
            body: None,
            hint: None,
            accept: "application/json".to_string(),
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, path_template)
    }

    /// Creates a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>, path_template: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path, path_template)
    }

    /// Appends a query pair.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a `Prefer` hint.
    #[must_use]
    pub fn hint(mut self, hint: ScenarioHint) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Overrides the `Accept` header.
    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking HTTP client bound to one backend.
pub struct ScenarioClient {
    /// Backend base URL.
    base_url: Url,
    /// HTTP client with redirects disabled.
    client: Client,
    /// Audit sink for request events.
    audit: Arc<dyn HarnessAuditSink>,
}

impl ScenarioClient {
    /// Builds a client for `base_url` bounded by `timeout` per request.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidRequest`] when the base URL is not an
    /// absolute http(s) URL, or when the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        audit: Arc<dyn HarnessAuditSink>,
    ) -> Result<Self, ScenarioError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ScenarioError::InvalidRequest(format!("base url {base_url}: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScenarioError::InvalidRequest(format!(
                "base url {base_url}: scheme must be http or https"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ScenarioError::InvalidRequest(err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            audit,
        })
    }

    /// Returns the backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues `request` once and captures the response.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Transport`] when no response is received and
    /// [`ScenarioError::InvalidRequest`] when the URL cannot be built.
    pub fn send(&self, request: &ScenarioRequest) -> Result<HttpInteraction, ScenarioError> {
        let url = self.request_url(request)?;
        let mut builder = self
            .client
            .request(reqwest_method(request.method), url.as_str())
            .header(ACCEPT, request.accept.as_str());
        if let Some(hint) = &request.hint {
            builder = builder.header(PREFER_HEADER, hint.header_value());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let result = builder.send().and_then(|response| capture(request, response));
        let (status, error) = match &result {
            Ok(interaction) => (Some(interaction.status()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        self.audit.record_scenario(&ScenarioRequestEvent::new(ScenarioRequestEventParams {
            method: request.method,
            path: request.path.clone(),
            path_template: request.path_template.clone(),
            hint: request.hint.as_ref().map(ScenarioHint::header_value),
            status,
            error,
            elapsed: started.elapsed(),
        }));
        result.map_err(|err| ScenarioError::Transport(err.to_string()))
    }

    /// Joins the base URL, the concrete path, and the query pairs.
    fn request_url(&self, request: &ScenarioRequest) -> Result<Url, ScenarioError> {
        if !request.path.starts_with('/') {
            return Err(ScenarioError::InvalidRequest(format!(
                "path must start with '/': {}",
                request.path
            )));
        }
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), request.path);
        let mut url = Url::parse(&joined)
            .map_err(|err| ScenarioError::InvalidRequest(format!("{joined}: {err}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

/// Converts the response into an interaction.
fn capture(request: &ScenarioRequest, response: Response) -> reqwest::Result<HttpInteraction> {
    let status = response.status().as_u16();
    let mut interaction = HttpInteraction::new(request.method, request.path_template.clone(), status)
        .with_request_path(request.path.clone());
    let content_type =
        response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).map(str::to_string);
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            interaction = interaction.with_header(name.as_str(), value);
        }
    }
    if let Some(content_type) = content_type {
        interaction = interaction.with_content_type(content_type);
    }
    let body = response.text()?;
    Ok(interaction.with_body(body))
}

/// Maps a specification method onto the client method type.
const fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Trace => Method::TRACE,
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Client plus validator, built once per suite and passed explicitly.
pub struct ScenarioContext {
    /// Client bound to the backend under test.
    client: ScenarioClient,
    /// Validator over the backend's API document.
    validator: Arc<ContractValidator>,
    /// Audit sink for validation events.
    audit: Arc<dyn HarnessAuditSink>,
}

impl ScenarioContext {
    /// Bundles a client and a validator.
    #[must_use]
    pub fn new(
        client: ScenarioClient,
        validator: Arc<ContractValidator>,
        audit: Arc<dyn HarnessAuditSink>,
    ) -> Self {
        Self {
            client,
            validator,
            audit,
        }
    }

    /// Returns the client.
    #[must_use]
    pub const fn client(&self) -> &ScenarioClient {
        &self.client
    }

    /// Returns the validator.
    #[must_use]
    pub const fn validator(&self) -> &Arc<ContractValidator> {
        &self.validator
    }

    /// Sends `request` and validates the interaction against its template.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Scenario`] for transport failures and
    /// [`HarnessError::Contract`] for any contract violation.
    pub fn run(&self, request: &ScenarioRequest) -> Result<HttpInteraction, HarnessError> {
        let interaction = self.client.send(request)?;
        self.check(&interaction)?;
        Ok(interaction)
    }

    /// Validates a captured interaction and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] when the report is non-empty.
    pub fn check(&self, interaction: &HttpInteraction) -> Result<(), ContractViolation> {
        let result = self.validator.assert_interaction(interaction);
        let (violations, keys) = match &result {
            Ok(()) => (0, Vec::new()),
            Err(violation) => (violation.report.len(), violation.report.keys()),
        };
        self.audit.record_validation(&ContractValidationEvent::new(
            interaction.method(),
            interaction.path_template(),
            interaction.status(),
            violations,
            keys,
        ));
        result
    }
}
