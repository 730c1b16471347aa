// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep async check bounds consistent and configurable across suites.
// ============================================================================

use std::time::Duration;

use contract_probe_config::ConfigError;
use contract_probe_config::read_env_strict;

const ENV_TIMEOUT_SECS: &str = "CONTRACT_PROBE_SYSTEM_TEST_TIMEOUT_SEC";

/// Default bound for one-shot async checks.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the effective timeout, honoring `CONTRACT_PROBE_SYSTEM_TEST_TIMEOUT_SEC` when set.
/// The override acts as a minimum to avoid shortening explicitly longer test timeouts.
pub fn resolve_timeout(requested: Duration) -> Result<Duration, String> {
    apply_override(requested, read_env_strict(ENV_TIMEOUT_SECS))
}

/// Applies a raw override read; unreadable values fail instead of being ignored.
fn apply_override(
    requested: Duration,
    raw: Result<Option<String>, ConfigError>,
) -> Result<Duration, String> {
    match raw.map_err(|err| err.to_string())? {
        Some(raw) => {
            let override_timeout =
                parse_timeout_secs(&raw).map_err(|err| format!("{ENV_TIMEOUT_SECS} {err}"))?;
            Ok(std::cmp::max(requested, override_timeout))
        }
        None => Ok(requested),
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("must be a positive integer number of seconds".to_string());
    }
    let secs: u64 =
        trimmed.parse().map_err(|_| "must be a positive integer number of seconds".to_string())?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

#[test]
fn override_only_lengthens_the_requested_timeout() {
    let requested = Duration::from_secs(5);
    assert_eq!(apply_override(requested, Ok(None)), Ok(requested));
    assert_eq!(apply_override(requested, Ok(Some("12".to_string()))), Ok(Duration::from_secs(12)));
    assert_eq!(apply_override(requested, Ok(Some(" 2 ".to_string()))), Ok(requested));
}

#[test]
fn unreadable_override_is_an_error() {
    let invalid = apply_override(DEFAULT_CHECK_TIMEOUT, Err(ConfigError::InvalidUtf8(ENV_TIMEOUT_SECS)));
    assert_eq!(invalid, Err(format!("{ENV_TIMEOUT_SECS} must be valid UTF-8")));
    let zero = apply_override(DEFAULT_CHECK_TIMEOUT, Ok(Some("0".to_string())));
    assert_eq!(zero, Err(format!("{ENV_TIMEOUT_SECS} must be greater than zero")));
}
