// crates/contract-probe-core/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy shared by the verification harness.
// Purpose: Aggregate readiness, load, contract, and transport failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Each component owns its error enum; [`HarnessError`] aggregates them so a
//! test can propagate any failure with `?`. Contract violations carry the full
//! itemized report in their `Display` output and are never downgraded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::readiness::ReadinessError;
use crate::report::ValidationReport;
use crate::scenario::ScenarioError;
use crate::spec::HttpMethod;
use crate::spec::SpecificationLoadError;

// ============================================================================
// SECTION: Contract Violation
// ============================================================================

/// One or more mismatches between an interaction and the contract.
///
/// # Invariants
/// - `report` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("OpenAPI validation errors for {method} {path_template} (status {status}): {report}")]
pub struct ContractViolation {
    /// Method of the validated interaction.
    pub method: HttpMethod,
    /// Template used for the specification lookup.
    pub path_template: String,
    /// Observed status code.
    pub status: u16,
    /// Full itemized report.
    pub report: ValidationReport,
}

// ============================================================================
// SECTION: Aggregate Error
// ============================================================================

/// Any failure raised while verifying a backend.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The backend never became ready.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),
    /// The API document could not be loaded.
    #[error(transparent)]
    Specification(#[from] SpecificationLoadError),
    /// The interaction violated the contract.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// The scenario request failed or an expectation did not hold.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
