// crates/contract-probe-mock/src/backend/tests.rs
// ============================================================================
// Module: Mock Backend Unit Tests
// Description: Unit tests for routing and response selection.
// Purpose: Ensure `Prefer` hints and example fallbacks pick the right response.
// ============================================================================

#![allow(clippy::expect_used, reason = "Unit tests use expect for setup clarity.")]

use std::sync::Arc;

use contract_probe_core::ApiSpecification;
use contract_probe_core::HttpMethod;
use serde_json::json;

use super::MockBackend;

const DOCUMENT: &str = r##"
openapi: "3.0.3"
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              example:
                - id: 1
                  name: Rex
        "201":
          description: also ok
        "400":
          description: bad
          content:
            application/json:
              examples:
                badLimit:
                  value:
                    code: BAD_REQUEST
                    message: limit
                other:
                  value:
                    code: OTHER
                    message: other
  /pets/{petId}:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
        "404":
          description: missing
          content:
            application/json:
              examples:
                notFound:
                  value:
                    code: NOT_FOUND
                    message: gone
  /pets/mine:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              example:
                mine: true
  /errors:
    get:
      responses:
        "500":
          description: always fails
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id:
          type: integer
        name:
          type: string
"##;

fn backend() -> MockBackend {
    let spec = ApiSpecification::parse("mock.yaml", DOCUMENT).expect("parse fixture");
    MockBackend::new(Arc::new(spec))
}

#[test]
fn without_hint_lowest_success_example_is_served() {
    let response = backend().respond(HttpMethod::Get, "/pets", None);
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body, Some(json!([{"id": 1, "name": "Rex"}])));
}

#[test]
fn hint_forces_status_and_named_example() {
    let response = backend().respond(HttpMethod::Get, "/pets", Some("code=400,example=badLimit"));
    assert_eq!(response.status, 400);
    assert_eq!(response.body, Some(json!({"code": "BAD_REQUEST", "message": "limit"})));
}

#[test]
fn unknown_example_falls_back_to_first() {
    let response = backend().respond(HttpMethod::Get, "/pets", Some("code=400,example=nope"));
    assert_eq!(response.status, 400);
    assert_eq!(response.body, Some(json!({"code": "BAD_REQUEST", "message": "limit"})));
}

#[test]
fn hint_without_declared_response_is_a_mock_error() {
    let response = backend().respond(HttpMethod::Get, "/pets", Some("code=418"));
    assert_eq!(response.status, 500);
    assert_eq!(response.body.expect("body")["code"], "MOCK_NO_RESPONSE");
}

#[test]
fn contentless_response_has_no_body() {
    let response = backend().respond(HttpMethod::Get, "/pets", Some("code=201"));
    assert_eq!(response.status, 201);
    assert_eq!(response.body, None);
    assert_eq!(response.content_type, None);
}

#[test]
fn template_parameters_match_any_segment() {
    let response = backend().respond(HttpMethod::Get, "/pets/999999", Some("code=404,example=notFound"));
    assert_eq!(response.status, 404);
    assert_eq!(response.body.expect("body")["code"], "NOT_FOUND");
}

#[test]
fn literal_template_beats_parameter_template() {
    let response = backend().respond(HttpMethod::Get, "/pets/mine", None);
    assert_eq!(response.body, Some(json!({"mine": true})));
}

#[test]
fn schema_sample_is_served_without_example() {
    let response = backend().respond(HttpMethod::Get, "/pets/1001", None);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, Some(json!({"id": 0, "name": "string"})));
}

#[test]
fn unknown_route_is_not_found() {
    let backend = backend();
    let response = backend.respond(HttpMethod::Get, "/owners", None);
    assert_eq!(response.status, 404);
    assert_eq!(response.body.expect("body")["code"], "MOCK_ROUTE_NOT_FOUND");
    assert_eq!(backend.respond(HttpMethod::Post, "/pets", None).status, 404);
}

#[test]
fn operation_without_success_is_a_mock_error() {
    let response = backend().respond(HttpMethod::Get, "/errors", None);
    assert_eq!(response.status, 500);
    assert_eq!(response.body.expect("body")["code"], "MOCK_NO_RESPONSE");
}

#[test]
fn malformed_prefer_is_rejected() {
    let response = backend().respond(HttpMethod::Get, "/pets", Some("dynamic=true"));
    assert_eq!(response.status, 400);
    assert_eq!(response.body.expect("body")["code"], "MOCK_INVALID_PREFER");
}
