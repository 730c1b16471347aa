// crates/contract-probe-core/src/lib.rs
// ============================================================================
// Module: Contract Probe Core Library
// Description: Readiness polling, OpenAPI contract validation, and scenario requests.
// Purpose: Provide the verification harness used by Contract Probe system tests.
// Dependencies: jsonschema, reqwest, serde, serde_yaml, thiserror, tokio
// ============================================================================

//! ## Overview
//! `contract-probe-core` verifies a running backend against its OpenAPI
//! contract. A readiness poller blocks until the backend answers, a contract
//! validator loads the API document once and checks captured interactions
//! against it, and a scenario client attaches `Prefer` hints that force a
//! cooperating mock into specific response branches.
//! Invariants:
//! - An [`ApiSpecification`] is parsed once and never mutated afterwards.
//! - A non-empty [`ValidationReport`] always surfaces as a [`ContractViolation`].
//! - Readiness is only reported for an actual HTTP response in `[200, 500)`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod error;
pub mod hint;
pub mod interaction;
pub mod oneshot;
pub mod readiness;
pub mod report;
pub mod scenario;
pub mod spec;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::HarnessAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use error::ContractViolation;
pub use error::HarnessError;
pub use hint::HintError;
pub use hint::PREFER_HEADER;
pub use hint::ScenarioHint;
pub use interaction::HttpInteraction;
pub use oneshot::OneShotError;
pub use oneshot::expect_single_future;
pub use oneshot::expect_single_value;
pub use readiness::HttpProbe;
pub use readiness::PollClock;
pub use readiness::ProbeObservation;
pub use readiness::ReadinessError;
pub use readiness::ReadinessOutcome;
pub use readiness::ReadinessProbe;
pub use readiness::ReadinessTarget;
pub use readiness::SystemClock;
pub use readiness::poll_until_ready;
pub use readiness::wait_for_ready;
pub use report::ValidationMessage;
pub use report::ValidationReport;
pub use report::ViolationKind;
pub use scenario::ScenarioClient;
pub use scenario::ScenarioContext;
pub use scenario::ScenarioError;
pub use scenario::ScenarioRequest;
pub use spec::ApiSpecification;
pub use spec::HttpMethod;
pub use spec::MediaSpec;
pub use spec::Operation;
pub use spec::OperationKey;
pub use spec::ResponseKey;
pub use spec::ResponseSpec;
pub use spec::SpecificationLoadError;
pub use validator::ContractValidator;
