// crates/contract-probe-config/src/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for contract verification.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, and unparsable values fail
//! closed with a [`ConfigError`] naming the variable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default base URL of the petstore backend.
pub const DEFAULT_PETSTORE_BASE_URL: &str = "http://localhost:4020";

/// Default base URL of the accounts backend.
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "http://localhost:4010";

/// Default readiness bound in seconds.
const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 25;

/// Default poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Root directory API document paths are resolved against.
    ProjectRoot,
    /// Petstore backend base URL.
    PetstoreBaseUrl,
    /// Accounts backend base URL.
    AccountsBaseUrl,
    /// Readiness bound in seconds (positive integer).
    ReadinessTimeoutSeconds,
    /// Poll interval in milliseconds (positive integer).
    PollIntervalMillis,
    /// Audit log target (`stderr`, `off`, or a file path).
    AuditLog,
    /// Use externally started backends (`true`/`false` or `1`/`0`).
    ExternalBackends,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectRoot => "CONTRACT_PROBE_PROJECT_ROOT",
            Self::PetstoreBaseUrl => "CONTRACT_PROBE_PETSTORE_BASE_URL",
            Self::AccountsBaseUrl => "CONTRACT_PROBE_ACCOUNTS_BASE_URL",
            Self::ReadinessTimeoutSeconds => "CONTRACT_PROBE_READINESS_TIMEOUT_SEC",
            Self::PollIntervalMillis => "CONTRACT_PROBE_POLL_INTERVAL_MS",
            Self::AuditLog => "CONTRACT_PROBE_AUDIT_LOG",
            Self::ExternalBackends => "CONTRACT_PROBE_EXTERNAL_BACKENDS",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration failures, each naming the offending variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The value is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(&'static str),
    /// The value is set but empty or whitespace.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// The value failed validation.
    #[error("{name} {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Validation failure.
        message: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Where audit events are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuditLogTarget {
    /// Discard events.
    #[default]
    Off,
    /// Write JSON lines to stderr.
    Stderr,
    /// Append JSON lines to a file.
    File(PathBuf),
}

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Root directory API document paths are resolved against.
    pub project_root: PathBuf,
    /// Petstore backend base URL.
    pub petstore_base_url: String,
    /// Accounts backend base URL.
    pub accounts_base_url: String,
    /// Readiness bound.
    pub readiness_timeout: Duration,
    /// Delay between readiness attempts.
    pub poll_interval: Duration,
    /// Audit log target.
    pub audit_log: AuditLogTarget,
    /// Use externally started backends instead of in-process mocks.
    pub external_backends: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            petstore_base_url: DEFAULT_PETSTORE_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            readiness_timeout: Duration::from_secs(DEFAULT_READINESS_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            audit_log: AuditLogTarget::Off,
            external_backends: false,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8,
    /// is empty, or fails validation (for example, a non-HTTP base URL or a
    /// poll interval longer than the readiness bound).
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let project_root = read_env_nonempty(HarnessEnv::ProjectRoot)?
            .map_or(defaults.project_root, PathBuf::from);
        let petstore_base_url = read_env_nonempty(HarnessEnv::PetstoreBaseUrl)?
            .map(|value| parse_base_url(HarnessEnv::PetstoreBaseUrl, &value))
            .transpose()?
            .unwrap_or(defaults.petstore_base_url);
        let accounts_base_url = read_env_nonempty(HarnessEnv::AccountsBaseUrl)?
            .map(|value| parse_base_url(HarnessEnv::AccountsBaseUrl, &value))
            .transpose()?
            .unwrap_or(defaults.accounts_base_url);
        let readiness_timeout = read_env_nonempty(HarnessEnv::ReadinessTimeoutSeconds)?
            .map(|value| parse_positive(HarnessEnv::ReadinessTimeoutSeconds, &value, "seconds"))
            .transpose()?
            .map_or(defaults.readiness_timeout, Duration::from_secs);
        let poll_interval = read_env_nonempty(HarnessEnv::PollIntervalMillis)?
            .map(|value| parse_positive(HarnessEnv::PollIntervalMillis, &value, "milliseconds"))
            .transpose()?
            .map_or(defaults.poll_interval, Duration::from_millis);
        if poll_interval > readiness_timeout {
            return Err(ConfigError::Invalid {
                name: HarnessEnv::PollIntervalMillis.as_str(),
                message: "must not exceed the readiness timeout".to_string(),
            });
        }
        let audit_log = read_env_nonempty(HarnessEnv::AuditLog)?
            .map_or(AuditLogTarget::Off, |value| parse_audit_target(&value));
        let external_backends = parse_bool_env(
            HarnessEnv::ExternalBackends,
            read_env_nonempty(HarnessEnv::ExternalBackends)?,
        )?;
        Ok(Self {
            project_root,
            petstore_base_url,
            accounts_base_url,
            readiness_timeout,
            poll_interval,
            audit_log,
            external_backends,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the workspace root this crate was built from.
fn default_project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(key: HarnessEnv) -> Result<Option<String>, ConfigError> {
    let name = key.as_str();
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses an absolute http(s) base URL, dropping a trailing slash.
///
/// # Errors
///
/// Returns an error when the value is not an absolute http(s) URL with a host.
fn parse_base_url(key: HarnessEnv, raw: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        name: key.as_str(),
        message,
    };
    let url = Url::parse(raw).map_err(|err| invalid(format!("must be an absolute URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("must use http or https".to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("must include a host".to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parses a positive integer.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_positive(key: HarnessEnv, raw: &str, unit: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
        name: key.as_str(),
        message: format!("must be a positive integer number of {unit}"),
    })?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name: key.as_str(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Maps the audit setting onto a target; anything else is a file path.
fn parse_audit_target(raw: &str) -> AuditLogTarget {
    if raw.eq_ignore_ascii_case("off") {
        return AuditLogTarget::Off;
    }
    if raw.eq_ignore_ascii_case("stderr") {
        return AuditLogTarget::Stderr;
    }
    AuditLogTarget::File(PathBuf::from(raw))
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(key: HarnessEnv, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    if value.eq_ignore_ascii_case("true") || value == "1" {
        return Ok(true);
    }
    if value.eq_ignore_ascii_case("false") || value == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid {
        name: key.as_str(),
        message: "must be 1, 0, true, or false".to_string(),
    })
}
