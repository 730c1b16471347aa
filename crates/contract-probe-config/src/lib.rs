// crates/contract-probe-config/src/lib.rs
// ============================================================================
// Module: Contract Probe Configuration
// Description: Environment-backed configuration for the verification harness.
// Purpose: Provide typed access to base URLs, readiness bounds, and audit output.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Harness configuration is read from `CONTRACT_PROBE_*` environment variables
//! and mapped into a small typed structure shared by the system tests, the
//! accounts client, and the mock binary. Unset variables fall back to literal
//! defaults; set-but-invalid variables fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::AuditLogTarget;
pub use env::ConfigError;
pub use env::DEFAULT_ACCOUNTS_BASE_URL;
pub use env::DEFAULT_PETSTORE_BASE_URL;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
