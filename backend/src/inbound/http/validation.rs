//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every malformed input becomes `400 invalid_request` with
//! `details.field` naming the offending field and `details.code` a stable
//! snake_case code.

use std::str::FromStr;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::web;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    InvalidBody,
    ConflictingFields,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::ConflictingFields => "conflicting_fields",
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

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} is invalid: {reason}"))
        .with_value(ErrorCode::InvalidValue, value)
}

pub(crate) fn conflicting_fields_error(field: FieldName, other: FieldName) -> Error {
    let (field, other) = (field.as_str(), other.as_str());
    ValidationError::new(field, format!("{field} and {other} are mutually exclusive"))
        .with_code(ErrorCode::ConflictingFields)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a lower-case enum value such as a status.
pub(crate) fn parse_value<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|err| invalid_value_error(field, value, &err.to_string()))
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

fn invalid_body_error(detail: &str) -> Error {
    ValidationError::new("body", format!("request body is invalid: {detail}"))
        .with_code(ErrorCode::InvalidBody)
}

/// JSON extractor configuration that reports body errors in the API error
/// format instead of Actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        debug!(error = %err, "rejected JSON body");
        invalid_body_error(&err.to_string()).into()
    })
}

/// Query-string extractor configuration matching [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        debug!(error = %err, "rejected query string");
        ValidationError::new("query", format!("query string is invalid: {err}"))
            .with_code(ErrorCode::InvalidValue)
            .into()
    })
}
