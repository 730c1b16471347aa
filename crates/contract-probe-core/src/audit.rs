// crates/contract-probe-core/src/audit.rs
// ============================================================================
// Module: Harness Audit Logging
// Description: Structured events for readiness, scenario, and validation steps.
// Purpose: Emit JSON-line logs without hard dependencies on a log pipeline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines event payloads and sinks for harness logging. Events are
//! serialized as one JSON object per line; sinks write them to stderr, to an
//! append-only file, or discard them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::readiness::ProbeObservation;
use crate::spec::HttpMethod;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One readiness poll attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessAttemptEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Polled URL.
    pub url: String,
    /// One-based attempt number.
    pub attempt: u32,
    /// Elapsed time since polling started.
    pub elapsed_ms: u128,
    /// Response status when one was received.
    pub status: Option<u16>,
    /// Transport error when no response was received.
    pub error: Option<String>,
    /// Whether the attempt counted as ready.
    pub ready: bool,
}

impl ReadinessAttemptEvent {
    /// Creates a readiness event with a consistent timestamp.
    #[must_use]
    pub fn new(url: &str, attempt: u32, elapsed: Duration, observation: &ProbeObservation) -> Self {
        let (status, error) = match observation {
            ProbeObservation::Status(code) => (Some(*code), None),
            ProbeObservation::Transport(message) => (None, Some(message.clone())),
        };
        Self {
            event: "readiness_attempt",
            timestamp_ms: now_millis(),
            url: url.to_string(),
            attempt,
            elapsed_ms: elapsed.as_millis(),
            status,
            error,
            ready: observation.is_ready(),
        }
    }
}

/// One scenario request sent to the backend under test.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request method.
    pub method: HttpMethod,
    /// Concrete request path.
    pub path: String,
    /// Template used for validation.
    pub path_template: String,
    /// Rendered `Prefer` hint, when attached.
    pub hint: Option<String>,
    /// Response status when one was received.
    pub status: Option<u16>,
    /// Transport error when no response was received.
    pub error: Option<String>,
    /// Round-trip latency.
    pub elapsed_ms: u128,
}

/// Inputs required to construct a scenario request event.
pub struct ScenarioRequestEventParams {
    /// Request method.
    pub method: HttpMethod,
    /// Concrete request path.
    pub path: String,
    /// Template used for validation.
    pub path_template: String,
    /// Rendered `Prefer` hint, when attached.
    pub hint: Option<String>,
    /// Response status when one was received.
    pub status: Option<u16>,
    /// Transport error when no response was received.
    pub error: Option<String>,
    /// Round-trip latency.
    pub elapsed: Duration,
}

impl ScenarioRequestEvent {
    /// Creates a scenario event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ScenarioRequestEventParams) -> Self {
        Self {
            event: "scenario_request",
            timestamp_ms: now_millis(),
            method: params.method,
            path: params.path,
            path_template: params.path_template,
            hint: params.hint,
            status: params.status,
            error: params.error,
            elapsed_ms: params.elapsed.as_millis(),
        }
    }
}

/// Outcome of validating one interaction.
#[derive(Debug, Clone, Serialize)]
pub struct ContractValidationEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request method.
    pub method: HttpMethod,
    /// Template used for validation.
    pub path_template: String,
    /// Observed status.
    pub status: u16,
    /// Number of violations.
    pub violations: usize,
    /// Distinct violation keys.
    pub keys: Vec<&'static str>,
}

impl ContractValidationEvent {
    /// Creates a validation event with a consistent timestamp.
    #[must_use]
    pub fn new(
        method: HttpMethod,
        path_template: &str,
        status: u16,
        violations: usize,
        keys: Vec<&'static str>,
    ) -> Self {
        Self {
            event: "contract_validation",
            timestamp_ms: now_millis(),
            method,
            path_template: path_template.to_string(),
            status,
            violations,
            keys,
        }
    }
}

/// Returns the current time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for harness events.
pub trait HarnessAuditSink: Send + Sync {
    /// Record a readiness attempt.
    fn record_readiness(&self, event: &ReadinessAttemptEvent);

    /// Record a scenario request.
    fn record_scenario(&self, _event: &ScenarioRequestEvent) {}

    /// Record a validation outcome.
    fn record_validation(&self, _event: &ContractValidationEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event line.
    fn write_line<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl HarnessAuditSink for StderrAuditSink {
    fn record_readiness(&self, event: &ReadinessAttemptEvent) {
        Self::write_line(event);
    }

    fn record_scenario(&self, event: &ScenarioRequestEvent) {
        Self::write_line(event);
    }

    fn record_validation(&self, event: &ContractValidationEvent) {
        Self::write_line(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line.
    fn write_line<T: Serialize>(&self, event: &T) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

impl HarnessAuditSink for FileAuditSink {
    fn record_readiness(&self, event: &ReadinessAttemptEvent) {
        self.write_line(event);
    }

    fn record_scenario(&self, event: &ScenarioRequestEvent) {
        self.write_line(event);
    }

    fn record_validation(&self, event: &ContractValidationEvent) {
        self.write_line(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl HarnessAuditSink for NoopAuditSink {
    fn record_readiness(&self, _event: &ReadinessAttemptEvent) {}
}
