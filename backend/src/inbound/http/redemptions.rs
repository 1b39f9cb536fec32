//! Redemption HTTP handlers.
//!
//! ```text
//! POST  /api/v1/redemptions
//! PATCH /api/v1/redemptions/{id}/status
//! GET   /api/v1/redemptions/{id}
//! GET   /api/v1/redemptions?customerId&status&limit&cursor
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    ListRedemptionsRequest, RedeemRewardRequest, UpdateRedemptionStatusRequest,
};
use crate::domain::{RedemptionFilter, RedemptionId, RedemptionRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_page, parse_required_id, parse_required_status, parse_status,
};

/// Request payload for redeeming a reward.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRewardRequestBody {
    #[schema(format = "uuid")]
    pub customer_id: Option<String>,
    #[schema(format = "uuid")]
    pub reward_id: Option<String>,
}

/// Request payload for reviewing a redemption.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedemptionStatusRequestBody {
    #[schema(example = "APPROVED")]
    pub status: Option<String>,
}

/// Query parameters for listing redemptions.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRedemptionsQuery {
    /// Only redemptions made by this customer.
    pub customer_id: Option<String>,
    /// Only redemptions in this status.
    #[param(example = "PENDING")]
    pub status: Option<String>,
    /// Maximum number of items to return.
    pub limit: Option<u32>,
    /// Opaque continuation token from a previous page.
    pub cursor: Option<String>,
}

/// Redemption record returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub customer_id: String,
    #[schema(format = "uuid")]
    pub reward_id: String,
    pub points_redeemed: u32,
    #[schema(example = "RDM-20261019-7KQ2M9XD")]
    pub redemption_code: String,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(format = "date-time")]
    pub redemption_date: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<RedemptionRecord> for RedemptionResponseBody {
    fn from(value: RedemptionRecord) -> Self {
        Self {
            id: value.id.to_string(),
            customer_id: value.customer_id.to_string(),
            reward_id: value.reward_id.to_string(),
            points_redeemed: value.points_redeemed,
            redemption_code: value.redemption_code.to_string(),
            status: value.status.to_string(),
            redemption_date: value.redemption_date.to_rfc3339(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// One page of redemption records.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionPageBody {
    pub items: Vec<RedemptionResponseBody>,
    pub total: u64,
    pub next_cursor: Option<String>,
}

impl From<Page<RedemptionRecord>> for RedemptionPageBody {
    fn from(value: Page<RedemptionRecord>) -> Self {
        let page = value.map(RedemptionResponseBody::from);
        Self {
            items: page.items,
            total: page.total,
            next_cursor: page.next_cursor,
        }
    }
}

/// Redeem a reward for a customer.
///
/// Debits the reward's cost, decrements its stock and creates a `PENDING`
/// redemption in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/redemptions",
    request_body = RedeemRewardRequestBody,
    responses(
        (status = 201, description = "Reward redeemed", body = RedemptionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Reward not found", body = ErrorSchema),
        (status = 409, description = "Reward out of stock", body = ErrorSchema),
        (status = 422, description = "Insufficient points", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["redemptions"],
    operation_id = "redeemReward"
)]
#[post("/redemptions")]
pub async fn redeem_reward(
    state: web::Data<HttpState>,
    payload: web::Json<RedeemRewardRequestBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = RedeemRewardRequest {
        customer_id: parse_required_id(payload.customer_id, FieldName::new("customerId"))?,
        reward_id: parse_required_id(payload.reward_id, FieldName::new("rewardId"))?,
    };

    let record = state.redemptions.redeem(request).await?;
    Ok(HttpResponse::Created().json(RedemptionResponseBody::from(record)))
}

/// Approve or reject a redemption.
///
/// Rejecting a non-rejected redemption refunds its points and restores one
/// unit of stock.
#[utoipa::path(
    patch,
    path = "/api/v1/redemptions/{id}/status",
    params(("id" = uuid::Uuid, Path, description = "Redemption identifier")),
    request_body = UpdateRedemptionStatusRequestBody,
    responses(
        (status = 200, description = "Status updated", body = RedemptionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Redemption not found", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["redemptions"],
    operation_id = "updateRedemptionStatus"
)]
#[patch("/redemptions/{id}/status")]
pub async fn update_redemption_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRedemptionStatusRequestBody>,
) -> ApiResult<web::Json<RedemptionResponseBody>> {
    let redemption_id: RedemptionId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let status = parse_required_status(payload.into_inner().status, FieldName::new("status"))?;

    let record = state
        .redemptions
        .update_status(UpdateRedemptionStatusRequest {
            redemption_id,
            status,
        })
        .await?;
    Ok(web::Json(RedemptionResponseBody::from(record)))
}

/// Fetch one redemption.
#[utoipa::path(
    get,
    path = "/api/v1/redemptions/{id}",
    params(("id" = uuid::Uuid, Path, description = "Redemption identifier")),
    responses(
        (status = 200, description = "Redemption", body = RedemptionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Redemption not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["redemptions"],
    operation_id = "getRedemption"
)]
#[get("/redemptions/{id}")]
pub async fn get_redemption(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RedemptionResponseBody>> {
    let redemption_id: RedemptionId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let record = state.redemptions_query.get_by_id(redemption_id).await?;
    Ok(web::Json(RedemptionResponseBody::from(record)))
}

/// List redemptions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/redemptions",
    params(ListRedemptionsQuery),
    responses(
        (status = 200, description = "Redemptions", body = RedemptionPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["redemptions"],
    operation_id = "listRedemptions"
)]
#[get("/redemptions")]
pub async fn list_redemptions(
    state: web::Data<HttpState>,
    query: web::Query<ListRedemptionsQuery>,
) -> ApiResult<web::Json<RedemptionPageBody>> {
    let query = query.into_inner();
    let filter = RedemptionFilter {
        customer_id: query
            .customer_id
            .as_deref()
            .map(|raw| parse_id(raw, FieldName::new("customerId")))
            .transpose()?,
        status: query
            .status
            .as_deref()
            .map(|raw| parse_status(raw, FieldName::new("status")))
            .transpose()?,
    };
    let page = parse_page(query.limit, query.cursor.as_deref())?;

    let records = state
        .redemptions_query
        .list(ListRedemptionsRequest { filter, page })
        .await?;
    Ok(web::Json(RedemptionPageBody::from(records)))
}

#[cfg(test)]
#[path = "redemptions_tests.rs"]
mod tests;
