//! Points ledger HTTP handlers.
//!
//! ```text
//! GET  /api/v1/customers/{id}/points
//! GET  /api/v1/customers/{id}/points/entries?limit&cursor
//! POST /api/v1/customers/{id}/points/awards
//! ```

use actix_web::{HttpResponse, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AwardPointsRequest, PointsBalance, manual_award_reference};
use crate::domain::{CustomerId, Error, LedgerEntry, LedgerReference};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_page, parse_award_points, parse_required_text,
    parse_required_uuid,
};

/// Request payload for crediting points to a customer.
///
/// `amount` is a decimal string so fractional awards stay exact. Omitting
/// `referenceModule` records a manual award.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardPointsRequestBody {
    /// Decimal amount greater than zero and at most 1000000000.
    #[schema(example = "250")]
    pub amount: Option<String>,
    #[schema(example = "Quarterly contribution bonus")]
    pub description: Option<String>,
    /// Originating module; `REDEEM` is reserved for redemptions.
    #[schema(example = "CONTRIBUTION")]
    pub reference_module: Option<String>,
    #[schema(format = "uuid")]
    pub reference_id: Option<String>,
    #[schema(example = "CTB-2026-0042")]
    pub reference_code: Option<String>,
}

/// Query parameters for paging through ledger entries.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LedgerEntriesQuery {
    /// Maximum number of items to return.
    pub limit: Option<u32>,
    /// Opaque continuation token from a previous page.
    pub cursor: Option<String>,
}

/// Current balance of one customer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalanceResponseBody {
    #[schema(format = "uuid")]
    pub customer_id: String,
    #[schema(example = "1250")]
    pub balance: String,
}

impl From<PointsBalance> for PointsBalanceResponseBody {
    fn from(value: PointsBalance) -> Self {
        Self {
            customer_id: value.customer_id.to_string(),
            balance: value.balance.to_string(),
        }
    }
}

/// Ledger entry returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub customer_id: String,
    /// Signed amount; debits are negative.
    #[schema(example = "-500")]
    pub amount: String,
    #[schema(example = "DEBIT")]
    pub direction: String,
    pub description: String,
    #[schema(example = "REDEEM")]
    pub reference_module: String,
    #[schema(format = "uuid")]
    pub reference_id: String,
    pub reference_code: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<LedgerEntry> for LedgerEntryResponseBody {
    fn from(value: LedgerEntry) -> Self {
        let reference = value.reference();
        Self {
            id: value.id().to_string(),
            customer_id: value.customer_id().to_string(),
            amount: value.amount().to_string(),
            direction: value.direction().to_string(),
            description: value.description().to_owned(),
            reference_module: reference.module.clone(),
            reference_id: reference.id.to_string(),
            reference_code: reference.code.clone(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// One page of ledger entries.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryPageBody {
    pub items: Vec<LedgerEntryResponseBody>,
    pub total: u64,
    pub next_cursor: Option<String>,
}

impl From<Page<LedgerEntry>> for LedgerEntryPageBody {
    fn from(value: Page<LedgerEntry>) -> Self {
        let page = value.map(LedgerEntryResponseBody::from);
        Self {
            items: page.items,
            total: page.total,
            next_cursor: page.next_cursor,
        }
    }
}

fn parse_reference(payload: &mut AwardPointsRequestBody) -> Result<LedgerReference, Error> {
    let Some(module) = payload.reference_module.take() else {
        let code = payload
            .reference_code
            .take()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| "MANUAL".to_owned());
        return Ok(manual_award_reference(code.trim()));
    };
    Ok(LedgerReference {
        module: parse_required_text(Some(module), FieldName::new("referenceModule"))?,
        id: parse_required_uuid(payload.reference_id.take(), FieldName::new("referenceId"))?,
        code: parse_required_text(
            payload.reference_code.take(),
            FieldName::new("referenceCode"),
        )?,
    })
}

fn parse_award(
    customer_id: CustomerId,
    mut payload: AwardPointsRequestBody,
) -> Result<AwardPointsRequest, Error> {
    let amount = parse_award_points(payload.amount.take(), FieldName::new("amount"))?;
    let description =
        parse_required_text(payload.description.take(), FieldName::new("description"))?;
    let reference = parse_reference(&mut payload)?;
    Ok(AwardPointsRequest {
        customer_id,
        amount,
        description,
        reference,
    })
}

/// Current point balance of a customer.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/points",
    params(("id" = uuid::Uuid, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Balance", body = PointsBalanceResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "getPointsBalance"
)]
#[get("/customers/{id}/points")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PointsBalanceResponseBody>> {
    let customer_id: CustomerId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let balance = state.points_query.balance(customer_id).await?;
    Ok(web::Json(PointsBalanceResponseBody::from(balance)))
}

/// Ledger history of a customer, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/points/entries",
    params(
        ("id" = uuid::Uuid, Path, description = "Customer identifier"),
        LedgerEntriesQuery
    ),
    responses(
        (status = 200, description = "Ledger entries", body = LedgerEntryPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "listLedgerEntries"
)]
#[get("/customers/{id}/points/entries")]
pub async fn list_ledger_entries(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<LedgerEntriesQuery>,
) -> ApiResult<web::Json<LedgerEntryPageBody>> {
    let customer_id: CustomerId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let query = query.into_inner();
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let entries = state.points_query.list_entries(customer_id, page).await?;
    Ok(web::Json(LedgerEntryPageBody::from(entries)))
}

/// Credit points to a customer for a business event.
#[utoipa::path(
    post,
    path = "/api/v1/customers/{id}/points/awards",
    params(("id" = uuid::Uuid, Path, description = "Customer identifier")),
    request_body = AwardPointsRequestBody,
    responses(
        (status = 201, description = "Points awarded", body = LedgerEntryResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "awardPoints"
)]
#[post("/customers/{id}/points/awards")]
pub async fn award_points(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AwardPointsRequestBody>,
) -> ApiResult<HttpResponse> {
    let customer_id: CustomerId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let request = parse_award(customer_id, payload.into_inner())?;
    let entry = state.points.award_points(request).await?;
    Ok(HttpResponse::Created().json(LedgerEntryResponseBody::from(entry)))
}
