// crates/contract-probe-accounts/src/lib.rs
// ============================================================================
// Module: Contract Probe Accounts
// Description: Pass-through accounts client and its demo controller.
// Purpose: Consume the accounts API and re-expose it under `/demo/accounts`.
// Dependencies: axum, reqwest, serde, thiserror, url
// ============================================================================

//! ## Overview
//! [`AccountsClient`] is a thin async client over `GET /accounts` and
//! `GET /accounts/{id}`: one request per call, no retries, no transformation
//! of the payload. [`accounts_router`] exposes the list as
//! `GET /demo/accounts` and reports upstream failures as `502 Bad Gateway`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod controller;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::Account;
pub use client::AccountsClient;
pub use client::AccountsError;
pub use controller::accounts_router;
