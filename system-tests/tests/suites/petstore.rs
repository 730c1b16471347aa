// system-tests/tests/suites/petstore.rs
// ============================================================================
// Module: Petstore Contract Tests
// Description: Crafted petstore scenarios validated against the API document.
// Purpose: Ensure every observed interaction conforms to `api/petstore.yaml`.
// Dependencies: contract-probe-core, system-tests
// ============================================================================

//! ## Overview
//! Crafted petstore scenarios validated against the API document.
//! Every request goes through [`ScenarioContext::run`], so each test fails on
//! the first contract violation before its own expectations are checked.
//! All tests share one harness, so the document is loaded and its schemas
//! compiled once per suite run.
//! Invariants:
//! - Forced responses are validated against the forced status, not the 2xx.
//! - Concrete paths are sent; templates are validated.
//!
//! [`ScenarioContext::run`]: contract_probe_core::ScenarioContext::run

use std::error::Error;

use system_tests::scenarios;

use crate::helpers::suite;

#[test]
fn list_pets_pages_conform() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    for limit in scenarios::LIST_LIMITS {
        let interaction = harness.context().run(&scenarios::list_pets(limit))?;
        interaction.expect_status(200)?.expect_non_null_body()?;
        if !interaction.json_body()?.is_array() {
            return Err(format!("limit {limit}: expected a JSON array body").into());
        }
    }
    Ok(())
}

#[test]
fn list_pets_out_of_range_limit_is_bad_request() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::list_pets_bad_limit()?)?;
    interaction.expect_status(400)?.expect_field_eq("code", "BAD_REQUEST")?;
    Ok(())
}

#[test]
fn create_pet_returns_created_pet() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::create_pet("Buddy", "dog"))?;
    interaction.expect_status(201)?.expect_field_present("id")?.expect_field_eq("name", "Buddy")?;
    Ok(())
}

#[test]
fn create_pet_without_name_is_validation_error() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::create_pet_missing_name()?)?;
    interaction.expect_status(400)?.expect_field_eq("code", "VALIDATION_ERROR")?;
    Ok(())
}

#[test]
fn show_known_pet_conforms() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::show_pet(scenarios::KNOWN_PET_ID))?;
    interaction.expect_status_in(&[200, 404])?;
    Ok(())
}

#[test]
fn show_unknown_pet_is_not_found() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::show_pet_not_found()?)?;
    interaction.expect_status(404)?.expect_field_eq("code", "NOT_FOUND")?;
    if interaction.request_path() != "/pets/999999" || interaction.path_template() != "/pets/{petId}" {
        return Err("concrete path and template must be kept apart".into());
    }
    Ok(())
}

#[test]
fn validation_is_repeatable() -> Result<(), Box<dyn Error>> {
    let harness = suite::petstore()?;
    let interaction = harness.context().run(&scenarios::list_pets(5))?;
    let first = harness.context().validator().validate_interaction(&interaction);
    let second = harness.context().validator().validate_interaction(&interaction);
    if first != second || !first.is_empty() {
        return Err(format!("validation drifted between runs: {first}").into());
    }
    Ok(())
}

#[test]
fn suite_shares_one_document_and_backend() -> Result<(), Box<dyn Error>> {
    let first = suite::petstore()?;
    let second = suite::petstore()?;
    if !std::ptr::eq(first, second)
        || !std::sync::Arc::ptr_eq(first.backend().specification(), second.backend().specification())
    {
        return Err("petstore harness was built more than once".into());
    }
    Ok(())
}
