//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde::Deserialize;
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

async fn response_payload(error: Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("admin only"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("quiz not found"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::upstream("AI service request failed"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "secret": "x" }));

    let (status, header, payload) = response_payload(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn upstream_errors_keep_their_message() {
    let (status, header, payload) =
        response_payload(Error::upstream("AI service returned an invalid response")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header.is_none());
    assert_eq!(payload.code(), ErrorCode::UpstreamError);
    assert_eq!(payload.message(), "AI service returned an invalid response");
}

#[rstest]
#[actix_web::test]
async fn validation_details_reach_the_client() {
    let error = Error::invalid_request("title must not be empty")
        .with_details(json!({ "field": "title", "code": "empty_title" }));

    let (status, _, payload) = response_payload(error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload.details(),
        Some(&json!({ "field": "title", "code": "empty_title" }))
    );
}

#[derive(Deserialize)]
struct TitleBody {
    #[serde(rename = "title")]
    _title: String,
}

#[actix_web::test]
async fn malformed_json_uses_the_error_payload() {
    let app = actix_test::init_service(App::new().app_data(json_config()).route(
        "/",
        web::post().to(|_body: web::Json<TitleBody>| async { "ok" }),
    ))
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"title\": ")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_json");
}

#[given("an upstream error code")]
fn an_upstream_error_code() -> ErrorCode {
    ErrorCode::UpstreamError
}

#[when("the adapter maps the code to an HTTP status")]
fn the_adapter_maps_the_code_to_an_http_status(code: ErrorCode) -> StatusCode {
    status_for(code)
}

#[then("the status is 500 Internal Server Error")]
fn the_status_is_500(status: StatusCode) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
fn upstream_failures_surface_as_server_errors() {
    let code = an_upstream_error_code();
    let status = the_adapter_maps_the_code_to_an_http_status(code);
    the_status_is_500(status);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
