// crates/contract-probe-core/src/spec/tests.rs
// ============================================================================
// Module: API Specification Unit Tests
// Description: Unit tests for document parsing and response lookup.
// Purpose: Ensure operations, references, and nullable schemas are indexed correctly.
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::panic,
    reason = "Unit tests use expect and panic for fixture clarity."
)]

use serde_json::json;

use super::ApiSpecification;
use super::HttpMethod;
use super::ResponseKey;
use super::SpecificationLoadError;
use super::normalize_media_type;

const DOCUMENT: &str = r##"
openapi: "3.0.3"
info:
  title: Fixture
  version: "1"
paths:
  /items:
    get:
      operationId: listItems
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Item"
              example:
                - id: 1
                  label: first
        "400":
          $ref: "#/components/responses/Problem"
        4XX:
          description: client error
        default:
          description: anything else
  /items/{itemId}:
    get:
      responses:
        "200":
          description: ok
          headers:
            X-Trace:
              required: true
              schema:
                type: string
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Item"
              examples:
                first:
                  value:
                    id: 1
                    label: first
                second:
                  value:
                    id: 2
                    label: null
    delete:
      responses:
        "204":
          description: gone
components:
  schemas:
    Item:
      type: object
      required: [id]
      properties:
        id:
          type: integer
        label:
          type: string
          nullable: true
  responses:
    Problem:
      description: problem
      content:
        application/json:
          example:
            code: BAD
"##;

fn fixture() -> ApiSpecification {
    ApiSpecification::parse("fixture.yaml", DOCUMENT).expect("parse fixture")
}

#[test]
fn parse_indexes_operations_by_method_and_template() {
    let spec = fixture();
    assert_eq!(spec.version(), "3.0.3");
    assert_eq!(spec.source(), "fixture.yaml");
    assert_eq!(spec.operations().count(), 3);
    let list = spec.operation(HttpMethod::Get, "/items").expect("list operation");
    assert_eq!(list.operation_id.as_deref(), Some("listItems"));
    assert!(spec.operation(HttpMethod::Delete, "/items/{itemId}").is_some());
    assert!(spec.operation(HttpMethod::Post, "/items").is_none());
    assert!(spec.operation(HttpMethod::Get, "/items/1").is_none());
}

#[test]
fn response_lookup_prefers_exact_then_range_then_default() {
    let spec = fixture();
    let list = spec.operation(HttpMethod::Get, "/items").expect("list operation");
    assert_eq!(list.response(200).map(|(key, _)| key), Some(ResponseKey::Status(200)));
    assert_eq!(list.response(400).map(|(key, _)| key), Some(ResponseKey::Status(400)));
    assert_eq!(list.response(404).map(|(key, _)| key), Some(ResponseKey::Range(4)));
    assert_eq!(list.response(503).map(|(key, _)| key), Some(ResponseKey::Default));

    let delete = spec.operation(HttpMethod::Delete, "/items/{itemId}").expect("delete operation");
    assert!(delete.response(200).is_none());
    assert_eq!(delete.lowest_success(), Some(204));
}

#[test]
fn response_references_are_resolved() {
    let spec = fixture();
    let list = spec.operation(HttpMethod::Get, "/items").expect("list operation");
    let (_, problem) = list.response(400).expect("problem response");
    assert_eq!(problem.description, "problem");
    let (media_type, media) = problem.media("application/json").expect("json media");
    assert_eq!(media_type, "application/json");
    assert_eq!(media.example(None), Some(&json!({"code": "BAD"})));
}

#[test]
fn named_examples_fall_back_to_first_when_unknown() {
    let spec = fixture();
    let get = spec.operation(HttpMethod::Get, "/items/{itemId}").expect("get operation");
    let (_, ok) = get.response(200).expect("ok response");
    let (_, media) = ok.media("application/json; charset=utf-8").expect("json media");
    assert_eq!(media.example(Some("second")), Some(&json!({"id": 2, "label": null})));
    assert_eq!(media.example(Some("missing")), Some(&json!({"id": 1, "label": "first"})));
    assert!(ok.headers.get("x-trace").is_some_and(|header| header.required));
}

#[test]
fn nullable_is_normalized_to_null_type() {
    let spec = fixture();
    let label = &spec.components()["schemas"]["Item"]["properties"]["label"];
    assert_eq!(label["type"], json!(["string", "null"]));
    assert!(label.get("nullable").is_none());
}

#[test]
fn media_lookup_honors_wildcards() {
    let document = r#"
openapi: "3.0.0"
paths:
  /blob:
    get:
      responses:
        "200":
          description: ok
          content:
            text/*:
              schema:
                type: string
"#;
    let spec = ApiSpecification::parse("blob.yaml", document).expect("parse blob");
    let operation = spec.operation(HttpMethod::Get, "/blob").expect("blob operation");
    let (_, ok) = operation.response(200).expect("ok response");
    assert_eq!(ok.media("text/plain").map(|(key, _)| key), Some("text/*"));
    assert!(ok.media("application/json").is_none());
}

#[test]
fn parse_rejects_swagger_two() {
    let result = ApiSpecification::parse("old.yaml", "openapi: \"2.0\"\npaths: {}\n");
    assert!(matches!(result, Err(SpecificationLoadError::Invalid { .. })));
}

#[test]
fn parse_rejects_garbage() {
    let result = ApiSpecification::parse("bad.yaml", "openapi: [unterminated");
    assert!(matches!(result, Err(SpecificationLoadError::Parse { .. })));
}

#[test]
fn parse_rejects_unresolved_response_reference() {
    let document = r##"
openapi: "3.0.0"
paths:
  /x:
    get:
      responses:
        "200":
          $ref: "#/components/responses/Nope"
"##;
    let result = ApiSpecification::parse("ref.yaml", document);
    match result {
        Err(SpecificationLoadError::Invalid { message, .. }) => {
            assert!(message.contains("unresolved response reference"), "{message}");
        }
        other => panic!("expected invalid error, got {other:?}"),
    }
}

#[test]
fn parse_rejects_invalid_response_key() {
    let document = r#"
openapi: "3.0.0"
paths:
  /x:
    get:
      responses:
        "999":
          description: nope
"#;
    let result = ApiSpecification::parse("key.yaml", document);
    assert!(matches!(result, Err(SpecificationLoadError::Invalid { .. })));
}

#[test]
fn load_reports_missing_document() {
    let root = tempfile::tempdir().expect("tempdir");
    let result = ApiSpecification::load(root.path(), "api/absent.yaml");
    match result {
        Err(SpecificationLoadError::Missing(path)) => {
            assert!(path.ends_with("api/absent.yaml"));
        }
        other => panic!("expected missing error, got {other:?}"),
    }
}

#[test]
fn load_resolves_relative_to_project_root() {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(root.path().join("api")).expect("create api dir");
    std::fs::write(root.path().join("api/fixture.yaml"), DOCUMENT).expect("write fixture");
    let spec = ApiSpecification::load(root.path(), "api/fixture.yaml").expect("load fixture");
    assert!(spec.source().ends_with("fixture.yaml"));
    assert_eq!(spec, fixture_with_source(spec.source()));
}

fn fixture_with_source(source: &str) -> ApiSpecification {
    ApiSpecification::parse(source, DOCUMENT).expect("parse fixture")
}

#[test]
fn method_tokens_round_trip_case_insensitively() {
    assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
    assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    assert!("CONNECT".parse::<HttpMethod>().is_err());
}

#[test]
fn media_types_are_normalized() {
    assert_eq!(normalize_media_type("Application/JSON; charset=UTF-8"), "application/json");
    assert_eq!(normalize_media_type(""), "");
}
