//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module registers external schemas for the error envelope shared by every
//! endpoint; request and response bodies live beside their handlers.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the resource's current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The reward has no stock left.
    #[schema(rename = "out_of_stock")]
    OutOfStock,
    /// The customer's balance does not cover the reward.
    #[schema(rename = "insufficient_points")]
    InsufficientPoints,
    /// Storage is temporarily unavailable; retrying may succeed.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "out_of_stock")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "reward 3fa85f64-5717-4562-b3fc-2c963f66afa6 is out of stock")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_business_rule_codes() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in ["out_of_stock", "insufficient_points", "conflict"] {
            assert!(schema_json.contains(code), "schema should list {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_fields() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(
            schema_json.contains("traceId"),
            "schema should contain traceId field"
        );
        assert!(
            schema_json.contains("details"),
            "schema should contain details field"
        );
    }
}
