// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Contract Probe system-tests.
// Purpose: Provide suite-wide harnesses and timeout resolution.
// Dependencies: contract-probe-config, system-tests
// ============================================================================

//! ## Overview
//! Shared helpers for Contract Probe system-tests.
//! Invariants:
//! - System-test execution is deterministic and fail-closed.
//! - Backends are in-process mocks unless external backends are configured.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod suite;
pub mod timeouts;
