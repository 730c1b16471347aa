// system-tests/tests/accounts.rs
// ============================================================================
// Module: Accounts Suite
// Description: Aggregates accounts contract scenarios into one binary.
// Purpose: Keep accounts end-to-end coverage centralized.
// Dependencies: suites/*, helpers
// ============================================================================

//! Accounts suite entry point for system-tests.

mod helpers;

#[path = "suites/accounts.rs"]
mod accounts;
