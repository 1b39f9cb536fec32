//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (redemptions,
//!   points, health)
//! - **Schemas**: the error envelope wrappers ([`ErrorSchema`],
//!   [`ErrorCodeSchema`]) that describe domain errors without coupling them
//!   to utoipa
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rewards backend API",
        description = "Points ledger, reward redemption and redemption review.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::redemptions::redeem_reward,
        crate::inbound::http::redemptions::update_redemption_status,
        crate::inbound::http::redemptions::get_redemption,
        crate::inbound::http::redemptions::list_redemptions,
        crate::inbound::http::points::get_balance,
        crate::inbound::http::points::list_ledger_entries,
        crate::inbound::http::points::award_points,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "redemptions", description = "Redeem rewards and review redemptions"),
        (name = "points", description = "Customer balances and ledger history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_registers_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/redemptions",
            "/api/v1/redemptions/{id}",
            "/api/v1/redemptions/{id}/status",
            "/api/v1/customers/{id}/points",
            "/api/v1/customers/{id}/points/entries",
            "/api/v1/customers/{id}/points/awards",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn openapi_registers_response_bodies() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        for name in [
            "RedemptionResponseBody",
            "RedemptionPageBody",
            "LedgerEntryResponseBody",
            "PointsBalanceResponseBody",
        ] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
