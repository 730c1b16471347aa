// crates/contract-probe-core/src/report.rs
// ============================================================================
// Module: Validation Report
// Description: Itemized result of checking one interaction against a contract.
// Purpose: Carry every contract violation with a stable key and message.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`ValidationReport`] lists every violation found while validating one
//! interaction. An empty report is a pass. Reports are immutable once built and
//! render the full itemized list through `Display` so failures are diagnosable
//! without re-running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

// ============================================================================
// SECTION: Violation Kinds
// ============================================================================

/// Classification of a contract violation.
///
/// # Invariants
/// - Keys returned by [`ViolationKind::as_str`] are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationKind {
    /// No operation is declared for the method and template.
    PathMissing,
    /// The operation declares no response for the status.
    StatusUnknown,
    /// A body was returned without a content type.
    ContentTypeMissing,
    /// The content type is not declared for the response.
    ContentTypeNotAllowed,
    /// A body was returned for a response that declares no content.
    BodyUnexpected,
    /// The response declares a body schema but the body is empty.
    BodyMissing,
    /// The body is not valid JSON.
    BodyInvalidJson,
    /// The body does not satisfy the declared schema.
    BodySchema,
    /// A required response header is absent.
    HeaderMissing,
}

impl ViolationKind {
    /// Returns the stable message key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PathMissing => "validation.request.path.missing",
            Self::StatusUnknown => "validation.response.status.unknown",
            Self::ContentTypeMissing => "validation.response.contentType.missing",
            Self::ContentTypeNotAllowed => "validation.response.contentType.notAllowed",
            Self::BodyUnexpected => "validation.response.body.unexpected",
            Self::BodyMissing => "validation.response.body.missing",
            Self::BodyInvalidJson => "validation.response.body.schema.invalidJson",
            Self::BodySchema => "validation.response.body.schema",
            Self::HeaderMissing => "validation.response.header.missing",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Messages
// ============================================================================

/// One contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// Violation classification.
    pub kind: ViolationKind,
    /// Human-readable detail.
    pub message: String,
}

impl ValidationMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Ordered list of violations for one interaction.
///
/// # Invariants
/// - Never mutated after construction.
/// - Empty means the interaction conforms to the contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Violations in discovery order.
    messages: Vec<ValidationMessage>,
}

impl ValidationReport {
    /// Builds a report from collected messages.
    #[must_use]
    pub const fn new(messages: Vec<ValidationMessage>) -> Self {
        Self {
            messages,
        }
    }

    /// Returns true when no violation was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns true when at least one violation was found.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Returns the number of violations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns the violations in discovery order.
    #[must_use]
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Returns true when a violation of `kind` is present.
    #[must_use]
    pub fn contains(&self, kind: ViolationKind) -> bool {
        self.messages.iter().any(|message| message.kind == kind)
    }

    /// Returns the distinct keys present, in discovery order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for message in &self.messages {
            let key = message.kind.as_str();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            return f.write_str("no validation errors");
        }
        write!(f, "{} validation error(s):", self.messages.len())?;
        for message in &self.messages {
            write!(f, "\n- {message}")?;
        }
        Ok(())
    }
}
