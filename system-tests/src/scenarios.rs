// system-tests/src/scenarios.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Crafted requests shared by the end-to-end suites.
// Purpose: Keep concrete paths, templates, bodies, and hints in one place.
// Dependencies: contract-probe-core, serde_json
// ============================================================================

//! ## Overview
//! Each function returns one [`ScenarioRequest`] with both the concrete path
//! sent on the wire and the template it is validated against. Requests that
//! steer the mock carry a [`ScenarioHint`]; real backends ignore the header.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_probe_core::HintError;
use contract_probe_core::ScenarioHint;
use contract_probe_core::ScenarioRequest;
use serde_json::json;

// ============================================================================
// SECTION: Petstore
// ============================================================================

/// Page sizes exercised by the list scenario.
pub const LIST_LIMITS: [u32; 3] = [1, 5, 10];

/// Limit outside the documented `1..=100` range.
pub const OUT_OF_RANGE_LIMIT: u32 = 999;

/// Pet id the documented examples use.
pub const KNOWN_PET_ID: u64 = 1001;

/// Pet id no backend is expected to hold.
pub const UNKNOWN_PET_ID: u64 = 999_999;

/// `GET /pets?limit=<limit>`.
#[must_use]
pub fn list_pets(limit: u32) -> ScenarioRequest {
    ScenarioRequest::get("/pets", "/pets").query("limit", limit)
}

/// `GET /pets?limit=999` forced to the `badLimit` 400 example.
///
/// # Errors
///
/// Returns [`HintError`] when the hint cannot be built.
pub fn list_pets_bad_limit() -> Result<ScenarioRequest, HintError> {
    Ok(list_pets(OUT_OF_RANGE_LIMIT).hint(ScenarioHint::forced(400, "badLimit")?))
}

/// `POST /pets` with a complete new pet.
#[must_use]
pub fn create_pet(name: &str, tag: &str) -> ScenarioRequest {
    ScenarioRequest::post("/pets", "/pets").json(json!({ "name": name, "tag": tag }))
}

/// `POST /pets` without `name`, forced to the `missingName` 400 example.
///
/// # Errors
///
/// Returns [`HintError`] when the hint cannot be built.
pub fn create_pet_missing_name() -> Result<ScenarioRequest, HintError> {
    Ok(ScenarioRequest::post("/pets", "/pets")
        .json(json!({ "tag": "cat" }))
        .hint(ScenarioHint::forced(400, "missingName")?))
}

/// `GET /pets/{petId}` for a concrete id.
#[must_use]
pub fn show_pet(pet_id: u64) -> ScenarioRequest {
    ScenarioRequest::get(format!("/pets/{pet_id}"), "/pets/{petId}")
}

/// `GET /pets/999999` forced to the `notFound` 404 example.
///
/// # Errors
///
/// Returns [`HintError`] when the hint cannot be built.
pub fn show_pet_not_found() -> Result<ScenarioRequest, HintError> {
    Ok(show_pet(UNKNOWN_PET_ID).hint(ScenarioHint::forced(404, "notFound")?))
}

// ============================================================================
// SECTION: Accounts
// ============================================================================

/// `GET /accounts`.
#[must_use]
pub fn list_accounts() -> ScenarioRequest {
    ScenarioRequest::get("/accounts", "/accounts")
}

/// `GET /accounts/{id}` forced to the `notFound` 404 example.
///
/// # Errors
///
/// Returns [`HintError`] when the hint cannot be built.
pub fn show_account_not_found(id: &str) -> Result<ScenarioRequest, HintError> {
    Ok(ScenarioRequest::get(format!("/accounts/{id}"), "/accounts/{id}")
        .hint(ScenarioHint::forced(404, "notFound")?))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
