// crates/contract-probe-core/tests/petstore_document.rs
// ============================================================================
// Module: Petstore Document Tests
// Description: Validator behavior against the checked-in petstore contract.
// Purpose: Ensure the shipped document loads and classifies canned responses.
// ============================================================================

#![allow(
    missing_docs,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use contract_probe_core::ContractValidator;
use contract_probe_core::HttpMethod;
use contract_probe_core::SpecificationLoadError;
use contract_probe_core::ViolationKind;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn petstore() -> ContractValidator {
    ContractValidator::load(&workspace_root(), "api/petstore.yaml").expect("load petstore")
}

#[test]
fn petstore_document_declares_expected_operations() {
    let validator = petstore();
    let spec = validator.specification();
    assert!(spec.operation(HttpMethod::Get, "/pets").is_some());
    assert!(spec.operation(HttpMethod::Post, "/pets").is_some());
    assert!(spec.operation(HttpMethod::Get, "/pets/{petId}").is_some());
    assert_eq!(spec.operations().count(), 3);
}

#[test]
fn accounts_document_loads() {
    let validator =
        ContractValidator::load(&workspace_root(), "api/accounts.yaml").expect("load accounts");
    assert!(validator.specification().operation(HttpMethod::Get, "/accounts/{id}").is_some());
}

#[test]
fn list_pets_example_conforms() {
    let body = r#"[{"id": 1, "name": "Rex", "tag": "dog"}, {"id": 2, "name": "Tom", "tag": null}]"#;
    let report = petstore().validate(HttpMethod::Get, "/pets", 200, body, "application/json");
    assert!(report.is_empty(), "{report}");
}

#[test]
fn forced_bad_request_conforms() {
    let body = r#"{"code": "BAD_REQUEST", "message": "limit must be between 1 and 100"}"#;
    petstore().assert_valid(HttpMethod::Get, "/pets", 400, body, "application/json").unwrap();
}

#[test]
fn created_pet_missing_name_violates() {
    let report =
        petstore().validate(HttpMethod::Post, "/pets", 201, r#"{"id": 1001}"#, "application/json");
    assert_eq!(report.keys(), vec![ViolationKind::BodySchema.as_str()]);
}

#[test]
fn undeclared_status_on_pet_lookup_violates() {
    let report = petstore().validate(HttpMethod::Get, "/pets/{petId}", 302, "", "application/json");
    // 302 falls through to `default`, whose body schema demands a payload.
    assert_eq!(report.keys(), vec![ViolationKind::BodyMissing.as_str()]);
}

#[test]
fn unknown_template_is_reported() {
    let report = petstore().validate(HttpMethod::Delete, "/pets/{petId}", 204, "", "application/json");
    assert!(report.contains(ViolationKind::PathMissing));
    assert_eq!(report.len(), 1);
}

#[test]
fn validation_of_same_interaction_is_stable() {
    let validator = petstore();
    let body = r#"{"id": "not-a-number", "name": 7}"#;
    let first = validator.validate(HttpMethod::Get, "/pets/{petId}", 200, body, "application/json");
    let second = validator.validate(HttpMethod::Get, "/pets/{petId}", 200, body, "application/json");
    assert!(first.has_errors());
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn missing_document_fails_fast() {
    let result = ContractValidator::load(&workspace_root(), "api/missing.yaml");
    assert!(matches!(result, Err(SpecificationLoadError::Missing(_))));
}
