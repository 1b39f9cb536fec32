//! PostgreSQL-backed `RewardCatalogStore` implementation using Diesel ORM.
//!
//! Stock moves through single conditional `UPDATE` statements so each call
//! validates itself even without a prior `FOR UPDATE` lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PointsPersistenceError, RewardCatalogStore};
use crate::domain::{RewardCatalogItem, RewardId, StockUpdate};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_unit_of_work::DieselTransaction;
use super::models::{NewRewardCatalogItemRow, RewardCatalogItemRow};
use super::pool::DbPool;
use super::schema::reward_catalog_items;

/// Diesel-backed implementation of the reward catalogue port.
#[derive(Clone)]
pub struct DieselRewardCatalogStore {
    pool: DbPool,
}

impl DieselRewardCatalogStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a catalogue item outside any redemption transaction.
    pub async fn insert(&self, item: &RewardCatalogItem) -> Result<(), PointsPersistenceError> {
        let row = NewRewardCatalogItemRow::try_from(item)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reward_catalog_items::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    /// Committed state of a live catalogue item.
    pub async fn find(
        &self,
        reward_id: &RewardId,
    ) -> Result<Option<RewardCatalogItem>, PointsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        reward_catalog_items::table
            .find(reward_id.as_uuid())
            .filter(reward_catalog_items::deleted_at.is_null())
            .select(RewardCatalogItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(RewardCatalogItem::try_from)
            .transpose()
    }

    /// Mark a catalogue item deleted. Returns whether a live row matched.
    pub async fn soft_delete(
        &self,
        reward_id: &RewardId,
        at: DateTime<Utc>,
    ) -> Result<bool, PointsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            reward_catalog_items::table
                .find(reward_id.as_uuid())
                .filter(reward_catalog_items::deleted_at.is_null()),
        )
        .set(reward_catalog_items::deleted_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected == 1)
    }
}

fn stock_update(affected: usize) -> StockUpdate {
    if affected == 0 {
        StockUpdate::NoMatchingRow
    } else {
        StockUpdate::Applied
    }
}

#[async_trait]
impl RewardCatalogStore for DieselRewardCatalogStore {
    type Transaction = DieselTransaction;

    async fn get_for_update(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<Option<RewardCatalogItem>, PointsPersistenceError> {
        reward_catalog_items::table
            .find(reward_id.as_uuid())
            .filter(reward_catalog_items::deleted_at.is_null())
            .select(RewardCatalogItemRow::as_select())
            .for_update()
            .first(transaction.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(RewardCatalogItem::try_from)
            .transpose()
    }

    async fn decrement_stock_if_positive(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError> {
        use reward_catalog_items::dsl::{deleted_at, id, stock_quantity};

        let affected = diesel::update(
            reward_catalog_items::table
                .filter(id.eq(reward_id.as_uuid()))
                .filter(deleted_at.is_null())
                .filter(stock_quantity.gt(0)),
        )
        .set(stock_quantity.eq(stock_quantity - 1))
        .execute(transaction.connection())
        .await
        .map_err(map_diesel_error)?;
        Ok(stock_update(affected))
    }

    async fn increment_stock(
        &self,
        transaction: &mut Self::Transaction,
        reward_id: &RewardId,
    ) -> Result<StockUpdate, PointsPersistenceError> {
        use reward_catalog_items::dsl::{id, stock_quantity};

        let affected = diesel::update(reward_catalog_items::table.filter(id.eq(reward_id.as_uuid())))
            .set(stock_quantity.eq(stock_quantity + 1))
            .execute(transaction.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(stock_update(affected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, StockUpdate::NoMatchingRow)]
    #[case(1, StockUpdate::Applied)]
    fn affected_rows_map_to_stock_update(#[case] affected: usize, #[case] expected: StockUpdate) {
        assert_eq!(stock_update(affected), expected);
    }
}
