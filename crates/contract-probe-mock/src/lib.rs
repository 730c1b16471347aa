// crates/contract-probe-mock/src/lib.rs
// ============================================================================
// Module: Contract Probe Mock Library
// Description: Cooperating mock backend driven by an OpenAPI document.
// Purpose: Serve declared examples and honor `Prefer` scenario hints.
// Dependencies: axum, contract-probe-core, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The mock backend stands in for a real service during contract runs. It
//! answers each request with a response declared in the document, so a
//! conforming mock always passes validation, and it lets a scenario force
//! error branches through the `Prefer` header instead of building real
//! invalid state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod sample;
pub mod server;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;

use contract_probe_core::SpecificationLoadError;
use thiserror::Error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::MockBackend;
pub use backend::MockResponse;
pub use sample::sample_from_schema;
pub use server::MockHandle;
pub use server::mock_router;
pub use server::serve;
pub use server::spawn_mock;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mock startup failures.
#[derive(Debug, Error)]
pub enum MockError {
    /// The listen address could not be bound.
    #[error("mock bind failed for {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A running server failed.
    #[error("mock server on {addr} failed: {source}")]
    Serve {
        /// Served address.
        addr: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The async runtime could not be built.
    #[error("mock runtime failed: {0}")]
    Runtime(String),
    /// The served document could not be loaded.
    #[error(transparent)]
    Specification(#[from] SpecificationLoadError),
    /// A `--serve` argument is malformed.
    #[error("invalid serve target: {0}")]
    InvalidServe(String),
}
