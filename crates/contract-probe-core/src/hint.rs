// crates/contract-probe-core/src/hint.rs
// ============================================================================
// Module: Scenario Hints
// Description: `Prefer` header directives that steer a cooperating mock.
// Purpose: Render and parse the `code=<status>,example=<name>` grammar.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ScenarioHint`] asks a cooperating mock backend to short-circuit to a
//! specific declared response (a forced status code and, optionally, a named
//! example) without constructing real invalid state. Hints travel in the
//! [`PREFER_HEADER`] request header and are not part of the API contract.
//!
//! Grammar: comma-separated `key=value` pairs, keys `code` (required, a status
//! in `100..=599`) and `example` (optional identifier). Key order and
//! surrounding whitespace are insignificant; unknown or repeated keys are
//! rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Request header carrying scenario hints.
pub const PREFER_HEADER: &str = "Prefer";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing a hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    /// The header value is empty.
    #[error("prefer hint is empty")]
    Empty,
    /// A directive is not of the form `key=value`.
    #[error("prefer directive malformed: {0}")]
    Malformed(String),
    /// The directive key is not recognized.
    #[error("prefer directive unknown: {0}")]
    UnknownKey(String),
    /// The directive key appears more than once.
    #[error("prefer directive repeated: {0}")]
    DuplicateKey(String),
    /// The `code` value is not a status code.
    #[error("prefer code invalid: {0}")]
    InvalidCode(String),
    /// The `example` value is not an identifier.
    #[error("prefer example invalid: {0}")]
    InvalidExample(String),
    /// No `code` directive was given.
    #[error("prefer hint missing code")]
    MissingCode,
}

// ============================================================================
// SECTION: Hint
// ============================================================================

/// Forced status plus optional named example.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioHint {
    /// Status code the mock should answer with.
    code: u16,
    /// Named example the mock should return.
    example: Option<String>,
}

impl ScenarioHint {
    /// Forces `code` with the response's default example.
    ///
    /// # Errors
    ///
    /// Returns [`HintError::InvalidCode`] when `code` is outside `100..=599`.
    pub fn status(code: u16) -> Result<Self, HintError> {
        if !(100..=599).contains(&code) {
            return Err(HintError::InvalidCode(code.to_string()));
        }
        Ok(Self {
            code,
            example: None,
        })
    }

    /// Forces `code` with the named example.
    ///
    /// # Errors
    ///
    /// Returns [`HintError`] when the code or example name is invalid.
    pub fn forced(code: u16, example: &str) -> Result<Self, HintError> {
        let mut hint = Self::status(code)?;
        hint.example = Some(parse_example(example)?);
        Ok(hint)
    }

    /// Returns the forced status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Returns the requested example name.
    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Renders the header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScenarioHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}", self.code)?;
        if let Some(example) = &self.example {
            write!(f, ",example={example}")?;
        }
        Ok(())
    }
}

impl FromStr for ScenarioHint {
    type Err = HintError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(HintError::Empty);
        }
        let mut code = None;
        let mut example = None;
        for directive in raw.split(',') {
            let (key, value) = directive
                .split_once('=')
                .map(|(key, value)| (key.trim(), value.trim()))
                .ok_or_else(|| HintError::Malformed(directive.trim().to_string()))?;
            if key.is_empty() || value.is_empty() {
                return Err(HintError::Malformed(directive.trim().to_string()));
            }
            match key.to_ascii_lowercase().as_str() {
                "code" => {
                    if code.is_some() {
                        return Err(HintError::DuplicateKey(key.to_string()));
                    }
                    let parsed: u16 =
                        value.parse().map_err(|_| HintError::InvalidCode(value.to_string()))?;
                    code = Some(Self::status(parsed)?.code);
                }
                "example" => {
                    if example.is_some() {
                        return Err(HintError::DuplicateKey(key.to_string()));
                    }
                    example = Some(parse_example(value)?);
                }
                _ => return Err(HintError::UnknownKey(key.to_string())),
            }
        }
        Ok(Self {
            code: code.ok_or(HintError::MissingCode)?,
            example,
        })
    }
}

/// Validates an example identifier.
fn parse_example(raw: &str) -> Result<String, HintError> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty()
        && trimmed.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if !valid {
        return Err(HintError::InvalidExample(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
