//! Port for redemption records.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{RedemptionFilter, RedemptionId, RedemptionRecord};

use super::PointsPersistenceError;

/// Port for creating, updating and reading redemption records.
#[cfg_attr(test, mockall::automock(type Transaction = ();))]
#[async_trait]
pub trait RedemptionStore: Send + Sync {
    /// Transaction handle shared with the other points stores.
    type Transaction: Send;

    /// Insert a new record inside `transaction`.
    ///
    /// Fails with [`PointsPersistenceError::Conflict`] when the redemption
    /// code is already taken.
    async fn create(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError>;

    /// Persist the status and `updated_at` of an existing record.
    async fn update(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError>;

    /// Lock and read a record for the rest of `transaction`.
    async fn find_for_update(
        &self,
        transaction: &mut Self::Transaction,
        id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError>;

    /// Read a committed record.
    async fn find_by_id(
        &self,
        id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError>;

    /// Committed records matching `filter`, newest first.
    async fn list(
        &self,
        filter: &RedemptionFilter,
        page: PageRequest,
    ) -> Result<Page<RedemptionRecord>, PointsPersistenceError>;
}
