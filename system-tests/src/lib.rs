// system-tests/src/lib.rs
// ============================================================================
// Module: Contract Probe System Tests Library
// Description: Backend harnesses and the scenario catalog for system tests.
// Purpose: Provide shared setup for the end-to-end suites in `system-tests/tests`.
// Dependencies: contract-probe-config, contract-probe-core, contract-probe-mock
// ============================================================================

//! ## Overview
//! This crate hosts the backend harnesses and the crafted scenario requests
//! used by the end-to-end suites. A harness reads [`HarnessConfig`], starts an
//! in-process mock unless external backends are configured, and blocks until
//! the backend answers its liveness path.
//!
//! [`HarnessConfig`]: contract_probe_config::HarnessConfig

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod harness;
pub mod scenarios;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use harness::AccountsHarness;
pub use harness::BackendHarness;
pub use harness::HarnessSetupError;
pub use harness::PetstoreHarness;
pub use harness::audit_sink;
