//! HTTP adapter mapping for domain errors.
//!
//! The domain error stays HTTP-agnostic; this module decides status codes,
//! redacts internal failures and turns malformed JSON bodies into the same
//! payload every handler returns.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const GENERIC_INTERNAL: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::UpstreamError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(GENERIC_INTERNAL);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        match self.code() {
            ErrorCode::InternalError => error!(message = self.message(), "internal error"),
            ErrorCode::UpstreamError | ErrorCode::ServiceUnavailable => {
                warn!(code = ?self.code(), message = self.message(), "dependency failure");
            }
            _ => {}
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(GENERIC_INTERNAL)
    }
}

/// Reject malformed JSON bodies with a 400 in the shared error shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            Error::invalid_request("request body is too large")
                .with_details(json!({ "field": "body", "code": "too_large" }))
        }
        JsonPayloadError::ContentType => Error::invalid_request("expected a JSON body")
            .with_details(json!({ "field": "body", "code": "content_type" })),
        _ => Error::invalid_request(format!("invalid JSON body: {err}"))
            .with_details(json!({ "field": "body", "code": "invalid_json" })),
    };
    error.into()
}

/// JSON extractor configuration applied to the API scope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

#[cfg(test)]
mod tests;
