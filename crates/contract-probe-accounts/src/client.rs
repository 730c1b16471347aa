// crates/contract-probe-accounts/src/client.rs
// ============================================================================
// Module: Accounts Client
// Description: Async HTTP client for the accounts API.
// Purpose: Fetch account lists and single accounts without retries.
// Dependencies: reqwest, serde, thiserror, url
// ============================================================================

//! ## Overview
//! The client resolves every request against a fixed base URL taken from the
//! harness configuration. Path parameters are percent-encoded as single
//! segments, so an id can never escape `/accounts/`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_probe_config::HarnessConfig;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One account as served by the accounts API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current balance.
    pub balance: f64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Accounts client failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountsError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid accounts base url: {0}")]
    InvalidBaseUrl(String),
    /// No response was received.
    #[error("accounts request failed: {0}")]
    Transport(String),
    /// The upstream answered with a non-success status.
    #[error("accounts upstream returned status {status}")]
    Status {
        /// Upstream status code.
        status: u16,
    },
    /// The body did not match the account shape.
    #[error("accounts response malformed: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Async client for the accounts API.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    /// Base URL every path is resolved against.
    base_url: Url,
    /// Shared HTTP client.
    http: Client,
}

impl AccountsClient {
    /// Builds a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsError::InvalidBaseUrl`] for relative, opaque, or
    /// non-HTTP URLs.
    pub fn new(base_url: &str) -> Result<Self, AccountsError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AccountsError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(AccountsError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .build()
            .map_err(|err| AccountsError::Transport(err.to_string()))?;
        Ok(Self {
            base_url,
            http,
        })
    }

    /// Builds a client for the configured accounts backend.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsError::InvalidBaseUrl`] when the configured URL is invalid.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, AccountsError> {
        Self::new(&config.accounts_base_url)
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches every account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsError`] on transport failure, non-2xx status, or a
    /// malformed body.
    pub async fn get_accounts(&self) -> Result<Vec<Account>, AccountsError> {
        self.get_json(&["accounts"]).await
    }

    /// Fetches one account by id.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsError::Status`] with `404` for unknown ids, and
    /// [`AccountsError`] on transport or decode failures.
    pub async fn get_account(&self, id: &str) -> Result<Account, AccountsError> {
        self.get_json(&["accounts", id]).await
    }

    /// Issues one GET below the base path and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AccountsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AccountsError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AccountsError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccountsError::Status {
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|err| AccountsError::Decode(err.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
