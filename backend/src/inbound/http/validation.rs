//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field and a stable machine-readable code, before any domain
//! service or transaction is involved.

use std::str::FromStr;

use pagination::{PageRequest, PaginationError};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, IdentifierError, Points, RedemptionStatus};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidStatus,
    InvalidAmount,
    InvalidLimit,
    InvalidCursor,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::InvalidLimit => "invalid_limit",
            ErrorCode::InvalidCursor => "invalid_cursor",
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

fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Parse a typed identifier such as `CustomerId` or `RewardId`.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    T::from_str(value).map_err(|err| {
        let field = field.as_str();
        let message = match err {
            IdentifierError::Malformed { .. } => format!("{field} must be a valid UUID"),
            IdentifierError::Nil { .. } => format!("{field} must not be the nil UUID"),
        };
        ValidationError::new(field, message).with_value(ErrorCode::InvalidUuid, value)
    })
}

/// Parse a required identifier from an optional body field.
pub(crate) fn parse_required_id<T>(value: Option<String>, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    let raw = require(value, field)?;
    parse_id(&raw, field)
}

/// Parse a required bare UUID, such as the id of an external business record.
pub(crate) fn parse_required_uuid(value: Option<String>, field: FieldName) -> Result<Uuid, Error> {
    let raw = require(value, field)?;
    Uuid::parse_str(raw.trim()).map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be a valid UUID"))
            .with_value(ErrorCode::InvalidUuid, raw.as_str())
    })
}

/// Parse a redemption status given in its wire form.
pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<RedemptionStatus, Error> {
    RedemptionStatus::from_str(value.trim()).map_err(|_| {
        let field = field.as_str();
        ValidationError::new(
            field,
            format!("{field} must be one of PENDING, APPROVED or REJECTED"),
        )
        .with_value(ErrorCode::InvalidStatus, value)
    })
}

/// Parse a required redemption status from an optional body field.
pub(crate) fn parse_required_status(
    value: Option<String>,
    field: FieldName,
) -> Result<RedemptionStatus, Error> {
    let raw = require(value, field)?;
    parse_status(&raw, field)
}

/// Parse an award amount: a decimal string in `(0, Points::MAX_AWARD]`.
pub(crate) fn parse_award_points(
    value: Option<String>,
    field: FieldName,
) -> Result<Points, Error> {
    let raw = require(value, field)?;
    let invalid = || {
        let name = field.as_str();
        ValidationError::new(
            name,
            format!(
                "{name} must be a positive decimal number no greater than {}",
                Points::MAX_AWARD
            ),
        )
        .with_value(ErrorCode::InvalidAmount, raw.as_str())
    };
    let amount = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    let points = Points::new(amount);
    if !points.is_positive() || points > Points::MAX_AWARD {
        return Err(invalid());
    }
    Ok(points)
}

/// Require a non-blank free-text field.
pub(crate) fn parse_required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    require(value, field).map(|raw| raw.trim().to_owned())
}

/// Validate listing parameters into a page window.
pub(crate) fn parse_page(limit: Option<u32>, cursor: Option<&str>) -> Result<PageRequest, Error> {
    PageRequest::from_query(limit, cursor).map_err(|err| match err {
        PaginationError::InvalidLimit { limit, .. } => {
            ValidationError::new("limit", err.to_string())
                .with_value(ErrorCode::InvalidLimit, limit.to_string())
        }
        PaginationError::InvalidCursor { .. } => {
            ValidationError::new("cursor", err.to_string()).with_code(ErrorCode::InvalidCursor)
        }
    })
}
