// system-tests/tests/helpers/suite.rs
// ============================================================================
// Module: Suite Harnesses
// Description: One backend harness per suite binary.
// Purpose: Load each API document and start each backend once per suite run.
// Dependencies: system-tests
// ============================================================================

//! ## Overview
//! The first test to ask for a harness builds it; every later test in the same
//! binary borrows the same document, validator, and backend. A setup failure
//! is kept as text and reported by every test that needs the harness.

use std::sync::LazyLock;

use system_tests::AccountsHarness;
use system_tests::PetstoreHarness;

/// Petstore harness shared by the petstore suite.
static PETSTORE: LazyLock<Result<PetstoreHarness, String>> =
    LazyLock::new(|| PetstoreHarness::start().map_err(|err| err.to_string()));

/// Accounts harness shared by the accounts suite.
static ACCOUNTS: LazyLock<Result<AccountsHarness, String>> =
    LazyLock::new(|| AccountsHarness::start().map_err(|err| err.to_string()));

/// Returns the suite-wide petstore harness.
pub fn petstore() -> Result<&'static PetstoreHarness, String> {
    PETSTORE.as_ref().map_err(|err| format!("petstore harness setup failed: {err}"))
}

/// Returns the suite-wide accounts harness.
pub fn accounts() -> Result<&'static AccountsHarness, String> {
    ACCOUNTS.as_ref().map_err(|err| format!("accounts harness setup failed: {err}"))
}
