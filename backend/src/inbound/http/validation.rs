//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure is a `400 invalid_request` whose `details` carry
//! the offending `field` and a stable machine-readable `code`.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, MaterialId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    FileTooLarge,
    InvalidMultipart,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::FileTooLarge => "file_too_large",
            ErrorCode::InvalidMultipart => "invalid_multipart",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

/// Domain validation failure reported against `field` with `code`.
pub(crate) fn field_error(field: FieldName, code: &str, error: impl ToString) -> Error {
    ValidationError::new(field, error.to_string()).with_code(code)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    ValidationError::new(field, format!("missing required field: {}", field.as_str()))
        .with_code(ErrorCode::MissingField.as_str())
}

pub(crate) fn file_too_large_error(field: FieldName, limit: usize) -> Error {
    Error::invalid_request("file too large").with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::FileTooLarge.as_str(),
        "limit": limit,
    }))
}

pub(crate) fn invalid_multipart_error(error: impl ToString) -> Error {
    ValidationError::new(FieldName::new("body"), error.to_string())
        .with_code(ErrorCode::InvalidMultipart.as_str())
}

/// Parse a path or body identifier, rejecting anything that is not a UUID.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse().map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

/// Parse a list of material ids, reporting the first bad entry's index.
pub(crate) fn parse_material_ids(
    values: Vec<String>,
    field: FieldName,
) -> Result<Vec<MaterialId>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.parse().map_err(|_| {
                ValidationError::new(field, format!("{} must contain valid UUIDs", field.as_str()))
                    .with_index(ErrorCode::InvalidUuid, index, value)
            })
        })
        .collect()
}
