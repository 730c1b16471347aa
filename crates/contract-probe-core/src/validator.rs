// crates/contract-probe-core/src/validator.rs
// ============================================================================
// Module: Contract Validator
// Description: Checks captured interactions against an OpenAPI specification.
// Purpose: Produce an itemized report of every contract violation.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! The [`ContractValidator`] owns a shared [`ApiSpecification`] and the
//! compiled body schemas of every declared response. Schemas are compiled once
//! at construction so a broken document fails before any test runs.
//! Validation looks up the operation by exact `(method, template)`, resolves
//! the response for the status, and checks content type, body schema, and
//! required headers, collecting every violation instead of stopping at the
//! first.
//! Invariants:
//! - Validation is pure: the same interaction always yields the same report.
//! - Unknown operations produce a report, never a panic.
//! - The `Prefer` request header plays no part in validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;

use crate::error::ContractViolation;
use crate::interaction::HttpInteraction;
use crate::report::ValidationMessage;
use crate::report::ValidationReport;
use crate::report::ViolationKind;
use crate::spec::ApiSpecification;
use crate::spec::HttpMethod;
use crate::spec::OperationKey;
use crate::spec::ResponseKey;
use crate::spec::ResponseSpec;
use crate::spec::SpecificationLoadError;
use crate::spec::normalize_media_type;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Identity of one compiled body schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SchemaSlot {
    /// Owning operation.
    operation: OperationKey,
    /// Owning response.
    response: ResponseKey,
    /// Normalized media type.
    media_type: String,
}

/// Validates interactions against a loaded specification.
///
/// # Invariants
/// - The specification and compiled schemas are read-only after construction.
pub struct ContractValidator {
    /// Shared specification document.
    specification: Arc<ApiSpecification>,
    /// Compiled body schemas keyed by operation, response, and media type.
    schemas: BTreeMap<SchemaSlot, Validator>,
}

impl ContractValidator {
    /// Loads `relative` under `project_root` and compiles every body schema.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationLoadError`] when the document is missing,
    /// malformed, or declares a schema that does not compile.
    pub fn load(project_root: &Path, relative: &str) -> Result<Self, SpecificationLoadError> {
        let specification = ApiSpecification::load(project_root, relative)?;
        Self::from_specification(Arc::new(specification))
    }

    /// Builds a validator over an already-loaded specification.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationLoadError::Schema`] when a body schema does not compile.
    pub fn from_specification(
        specification: Arc<ApiSpecification>,
    ) -> Result<Self, SpecificationLoadError> {
        let mut schemas = BTreeMap::new();
        for operation in specification.operations() {
            for (response_key, response) in &operation.responses {
                for (media_type, media) in &response.content {
                    let Some(schema) = &media.schema else {
                        continue;
                    };
                    let compiled = compile_schema(schema, specification.components()).map_err(
                        |message| SpecificationLoadError::Schema {
                            operation: operation.key.to_string(),
                            response: response_key.to_string(),
                            message,
                        },
                    )?;
                    schemas.insert(
                        SchemaSlot {
                            operation: operation.key.clone(),
                            response: *response_key,
                            media_type: media_type.clone(),
                        },
                        compiled,
                    );
                }
            }
        }
        Ok(Self {
            specification,
            schemas,
        })
    }

    /// Returns the shared specification.
    #[must_use]
    pub const fn specification(&self) -> &Arc<ApiSpecification> {
        &self.specification
    }

    /// Validates a response for `method` + `path_template`.
    ///
    /// `path_template` must be the template form (`/pets/{petId}`); concrete
    /// paths are not matched against templates.
    #[must_use]
    pub fn validate(
        &self,
        method: HttpMethod,
        path_template: &str,
        status: u16,
        body: &str,
        content_type: &str,
    ) -> ValidationReport {
        let interaction = HttpInteraction::new(method, path_template, status)
            .with_body(body)
            .with_content_type(content_type);
        self.validate_interaction(&interaction)
    }

    /// Validates a captured interaction using its path template.
    #[must_use]
    pub fn validate_interaction(&self, interaction: &HttpInteraction) -> ValidationReport {
        let mut messages = Vec::new();
        let method = interaction.method();
        let template = interaction.path_template();
        let Some(operation) = self.specification.operation(method, template) else {
            messages.push(ValidationMessage::new(
                ViolationKind::PathMissing,
                format!("No API operation found for {method} {template}"),
            ));
            return ValidationReport::new(messages);
        };
        let status = interaction.status();
        let Some((response_key, response)) = operation.response(status) else {
            let declared: Vec<String> =
                operation.responses.keys().map(ToString::to_string).collect();
            messages.push(ValidationMessage::new(
                ViolationKind::StatusUnknown,
                format!(
                    "Response status {status} not defined for {}; declared: [{}]",
                    operation.key,
                    declared.join(", ")
                ),
            ));
            return ValidationReport::new(messages);
        };

        self.check_body(&operation.key, response_key, response, interaction, &mut messages);
        check_headers(response, interaction, &mut messages);
        ValidationReport::new(messages)
    }

    /// Validates and converts a non-empty report into a [`ContractViolation`].
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] carrying the full report when any
    /// violation is found.
    pub fn assert_valid(
        &self,
        method: HttpMethod,
        path_template: &str,
        status: u16,
        body: &str,
        content_type: &str,
    ) -> Result<(), ContractViolation> {
        let interaction = HttpInteraction::new(method, path_template, status)
            .with_body(body)
            .with_content_type(content_type);
        self.assert_interaction(&interaction)
    }

    /// Validates a captured interaction and fails on any violation.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] carrying the full report when any
    /// violation is found.
    pub fn assert_interaction(&self, interaction: &HttpInteraction) -> Result<(), ContractViolation> {
        let report = self.validate_interaction(interaction);
        if report.is_empty() {
            return Ok(());
        }
        Err(ContractViolation {
            method: interaction.method(),
            path_template: interaction.path_template().to_string(),
            status: interaction.status(),
            report,
        })
    }

    /// Checks content type and body against the response declaration.
    fn check_body(
        &self,
        operation: &OperationKey,
        response_key: ResponseKey,
        response: &ResponseSpec,
        interaction: &HttpInteraction,
        messages: &mut Vec<ValidationMessage>,
    ) {
        let body = interaction.body();
        if body.trim().is_empty() {
            if response.declares_body_schema() {
                messages.push(ValidationMessage::new(
                    ViolationKind::BodyMissing,
                    format!("A response body is expected for {operation} {response_key} but none was returned"),
                ));
            }
            return;
        }
        if response.content.is_empty() {
            messages.push(ValidationMessage::new(
                ViolationKind::BodyUnexpected,
                format!("No response body is declared for {operation} {response_key}"),
            ));
            return;
        }
        let Some(content_type) =
            interaction.content_type().filter(|value| !value.trim().is_empty())
        else {
            messages.push(ValidationMessage::new(
                ViolationKind::ContentTypeMissing,
                "Response has a body but no Content-Type".to_string(),
            ));
            return;
        };
        let Some((media_type, _)) = response.media(content_type) else {
            let declared: Vec<&str> = response.content.keys().map(String::as_str).collect();
            messages.push(ValidationMessage::new(
                ViolationKind::ContentTypeNotAllowed,
                format!(
                    "Response Content-Type '{content_type}' is not allowed; declared: [{}]",
                    declared.join(", ")
                ),
            ));
            return;
        };
        let slot = SchemaSlot {
            operation: operation.clone(),
            response: response_key,
            media_type: media_type.to_string(),
        };
        let Some(schema) = self.schemas.get(&slot) else {
            return;
        };
        let instance = if is_json_media(&normalize_media_type(content_type)) {
            match serde_json::from_str::<Value>(body) {
                Ok(instance) => instance,
                Err(err) => {
                    messages.push(ValidationMessage::new(
                        ViolationKind::BodyInvalidJson,
                        format!("Unable to parse JSON body: {err}"),
                    ));
                    return;
                }
            }
        } else {
            Value::String(body.to_string())
        };
        for error in schema.iter_errors(&instance) {
            messages.push(ValidationMessage::new(ViolationKind::BodySchema, error.to_string()));
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks required response headers are present.
fn check_headers(
    response: &ResponseSpec,
    interaction: &HttpInteraction,
    messages: &mut Vec<ValidationMessage>,
) {
    for (name, header) in &response.headers {
        // Content-Type definitions are ignored by OpenAPI.
        if name == "content-type" || !header.required {
            continue;
        }
        if interaction.header(name).is_none() {
            messages.push(ValidationMessage::new(
                ViolationKind::HeaderMissing,
                format!("Header '{name}' is required but missing"),
            ));
        }
    }
}

/// Returns true for JSON media types (`application/json`, `*+json`).
fn is_json_media(media_type: &str) -> bool {
    media_type == "application/json" || media_type.ends_with("+json")
}

/// Compiles a response schema with the document components in scope.
///
/// The schema is wrapped so `#/components/schemas/*` pointers resolve against
/// the wrapper root.
fn compile_schema(schema: &Value, components: &Value) -> Result<Validator, String> {
    let mut root = Map::new();
    root.insert("components".to_string(), components.clone());
    root.insert("allOf".to_string(), Value::Array(vec![schema.clone()]));
    jsonschema::options()
        .with_draft(Draft::Draft4)
        .build(&Value::Object(root))
        .map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
