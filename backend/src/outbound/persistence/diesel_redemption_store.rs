//! PostgreSQL-backed `RedemptionStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{PointsPersistenceError, RedemptionStore};
use crate::domain::{RedemptionFilter, RedemptionId, RedemptionRecord};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_ledger_store::{page_window, row_count};
use super::diesel_unit_of_work::DieselTransaction;
use super::models::{NewRedemptionRow, RedemptionRow, RedemptionStatusUpdate};
use super::pool::DbPool;
use super::schema::reward_redemptions;

/// Diesel-backed implementation of the redemption records port.
#[derive(Clone)]
pub struct DieselRedemptionStore {
    pool: DbPool,
}

impl DieselRedemptionStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &RedemptionFilter) -> reward_redemptions::BoxedQuery<'static, Pg> {
    let mut query = reward_redemptions::table.into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(reward_redemptions::customer_id.eq(*customer_id.as_uuid()));
    }
    if let Some(status) = filter.status {
        query = query.filter(reward_redemptions::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl RedemptionStore for DieselRedemptionStore {
    type Transaction = DieselTransaction;

    async fn create(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError> {
        let row = NewRedemptionRow::try_from(record)?;
        let stored: RedemptionRow = diesel::insert_into(reward_redemptions::table)
            .values(&row)
            .returning(RedemptionRow::as_returning())
            .get_result(transaction.connection())
            .await
            .map_err(map_diesel_error)?;
        RedemptionRecord::try_from(stored)
    }

    async fn update(
        &self,
        transaction: &mut Self::Transaction,
        record: &RedemptionRecord,
    ) -> Result<RedemptionRecord, PointsPersistenceError> {
        let changes = RedemptionStatusUpdate {
            status: record.status.as_str(),
            updated_at: record.updated_at,
        };
        let stored: Option<RedemptionRow> =
            diesel::update(reward_redemptions::table.find(record.id.as_uuid()))
                .set(&changes)
                .returning(RedemptionRow::as_returning())
                .get_result(transaction.connection())
                .await
                .optional()
                .map_err(map_diesel_error)?;
        let row = stored.ok_or_else(|| {
            PointsPersistenceError::query(format!("redemption {} not found for update", record.id))
        })?;
        RedemptionRecord::try_from(row)
    }

    async fn find_for_update(
        &self,
        transaction: &mut Self::Transaction,
        redemption_id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError> {
        reward_redemptions::table
            .find(redemption_id.as_uuid())
            .select(RedemptionRow::as_select())
            .for_update()
            .first(transaction.connection())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(RedemptionRecord::try_from)
            .transpose()
    }

    async fn find_by_id(
        &self,
        redemption_id: &RedemptionId,
    ) -> Result<Option<RedemptionRecord>, PointsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        reward_redemptions::table
            .find(redemption_id.as_uuid())
            .select(RedemptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(RedemptionRecord::try_from)
            .transpose()
    }

    async fn list(
        &self,
        filter: &RedemptionFilter,
        page: PageRequest,
    ) -> Result<Page<RedemptionRecord>, PointsPersistenceError> {
        let (limit, offset) = page_window(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<RedemptionRow> = filtered(filter)
            .order((
                reward_redemptions::created_at.desc(),
                reward_redemptions::id.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(RedemptionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let records = rows
            .into_iter()
            .map(RedemptionRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(records, row_count(total)?, page))
    }
}
