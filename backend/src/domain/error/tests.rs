//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("clash"), ErrorCode::Conflict)]
#[case(Error::out_of_stock("empty"), ErrorCode::OutOfStock)]
#[case(Error::insufficient_points("poor"), ErrorCode::InsufficientPoints)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_request("bad").try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::out_of_stock("gone") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_payload() {
    let error = Error::insufficient_points("balance too low")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "balance": "50", "required": "100" }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["code"], "insufficient_points");
    assert_eq!(value["message"], "balance too low");
    assert_eq!(value["traceId"], TRACE_ID);
    assert_eq!(value["details"]["required"], "100");
}

#[rstest]
fn deserialising_empty_message_fails() {
    let result = serde_json::from_value::<Error>(json!({
        "code": "not_found",
        "message": " "
    }));
    assert!(result.is_err());
}

#[rstest]
fn business_rule_codes_are_distinct_from_storage_codes() {
    assert!(ErrorCode::InsufficientPoints.is_business_rule());
    assert!(!ErrorCode::InternalError.is_business_rule());
    assert!(!ErrorCode::NotFound.is_business_rule());
}
