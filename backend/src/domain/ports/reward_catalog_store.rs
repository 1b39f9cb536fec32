//! Port for the reward catalogue's stock counter.

use async_trait::async_trait;

use crate::domain::{RewardCatalogItem, RewardId, StockUpdate};

use super::PointsPersistenceError;

/// Port for locking catalogue rows and moving their stock.
#[cfg_attr(test, mockall::automock(type Transaction = ();))]
#[async_trait]
pub trait RewardCatalogStore: Send + Sync {
    /// Transaction handle shared with the other points stores.
    type Transaction: Send;

    /// Lock the live reward row for the rest of `transaction`.
    ///
    /// Returns `None` when the reward does not exist or is soft-deleted.
    async fn get_for_update(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<Option<RewardCatalogItem>, PointsPersistenceError>;

    /// Decrement stock by one when it is positive.
    ///
    /// Reports [`StockUpdate::NoMatchingRow`] when no live row with positive
    /// stock exists, so the call is safe without a prior lock.
    async fn decrement_stock_if_positive(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError>;

    /// Increment stock by one unconditionally.
    async fn increment_stock(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError>;
}
