//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed points ledger, reward catalogue and
//! redemption entities, the ports adapters implement, and the services that
//! enforce the business rules over them. Types are immutable where possible
//! and document their invariants and serialisation contracts (serde) in
//! their Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - LedgerEntry, RewardCatalogItem, RedemptionRecord: persisted entities.
//! - RedemptionEngine: transactional redeem and review orchestration.
//! - PointsLedgerService, RedemptionQueryService: ledger and read services.

pub mod error;
pub mod identifiers;
pub mod ledger;
pub mod points;
mod points_ledger_service;
pub(crate) mod points_service_support;
#[cfg(test)]
pub(crate) mod points_test_support;
pub mod ports;
pub mod redemption;
mod redemption_engine;
mod redemption_query_service;
pub mod reward;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifiers::{CustomerId, IdentifierError, LedgerEntryId, RedemptionId, RewardId};
pub use self::ledger::{
    AWARD_REFERENCE_MODULE, LedgerDirection, LedgerEntry, LedgerEntryDraft, LedgerReference,
    LedgerValidationError, REDEMPTION_REFERENCE_MODULE,
};
pub use self::points::Points;
pub use self::points_ledger_service::PointsLedgerService;
pub use self::redemption::{
    REDEMPTION_CODE_PREFIX, REDEMPTION_CODE_SUFFIX_LEN, RedemptionCode, RedemptionFilter,
    RedemptionRecord, RedemptionStatus, RedemptionValidationError, StatusTransitionError,
};
pub use self::redemption_engine::RedemptionEngine;
pub use self::redemption_query_service::RedemptionQueryService;
pub use self::reward::{
    RewardCatalogItem, RewardCatalogItemDraft, RewardValidationError, StockUpdate,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use rewards_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such reward"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
