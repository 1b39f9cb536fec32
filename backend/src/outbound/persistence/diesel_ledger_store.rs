//! PostgreSQL-backed `LedgerStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use rust_decimal::Decimal;

use crate::domain::ports::{LedgerStore, PointsPersistenceError};
use crate::domain::{CustomerId, LedgerEntry, LedgerEntryId, Points};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_unit_of_work::DieselTransaction;
use super::models::{LedgerEntryRow, NewLedgerEntryRow};
use super::pool::DbPool;
use super::schema::point_ledger_entries;

/// Transaction-scoped advisory lock serialising spenders of one customer.
///
/// `FOR UPDATE` alone cannot block a concurrent insert of a new debit row, so
/// the lock is taken first; a waiter re-reads the ledger after the holder
/// commits and sees its debit.
const CUSTOMER_LEDGER_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// Diesel-backed implementation of the ledger port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn page_window(page: PageRequest) -> Result<(i64, i64), PointsPersistenceError> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| PointsPersistenceError::query("page offset out of range"))?;
    Ok((i64::from(page.limit()), offset))
}

pub(crate) fn row_count(count: i64) -> Result<u64, PointsPersistenceError> {
    u64::try_from(count).map_err(|_| PointsPersistenceError::query("negative row count"))
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    type Transaction = DieselTransaction;

    async fn append_entry(
        &self,
        transaction: &mut Self::Transaction,
        entry: &LedgerEntry,
    ) -> Result<LedgerEntryId, PointsPersistenceError> {
        diesel::insert_into(point_ledger_entries::table)
            .values(NewLedgerEntryRow::from(entry))
            .execute(transaction.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(entry.id())
    }

    async fn balance_for_update(
        &self,
        transaction: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError> {
        diesel::sql_query(CUSTOMER_LEDGER_LOCK_SQL)
            .bind::<Text, _>(format!("point_ledger:{customer_id}"))
            .execute(transaction.connection())
            .await
            .map_err(map_diesel_error)?;

        let amounts: Vec<Decimal> = point_ledger_entries::table
            .filter(point_ledger_entries::customer_id.eq(customer_id.as_uuid()))
            .select(point_ledger_entries::amount)
            .for_update()
            .load(transaction.connection())
            .await
            .map_err(map_diesel_error)?;

        Points::checked_sum(amounts.into_iter().map(Points::new)).ok_or_else(|| {
            PointsPersistenceError::query(format!(
                "ledger balance for customer {customer_id} overflows"
            ))
        })
    }

    async fn balance_read_only(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: Option<Decimal> = point_ledger_entries::table
            .filter(point_ledger_entries::customer_id.eq(customer_id.as_uuid()))
            .select(diesel::dsl::sum(point_ledger_entries::amount))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Points::new(total.unwrap_or_default()))
    }

    async fn list_entries(
        &self,
        customer_id: &CustomerId,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, PointsPersistenceError> {
        let (limit, offset) = page_window(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = point_ledger_entries::table
            .filter(point_ledger_entries::customer_id.eq(customer_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<LedgerEntryRow> = point_ledger_entries::table
            .filter(point_ledger_entries::customer_id.eq(customer_id.as_uuid()))
            .order((
                point_ledger_entries::created_at.desc(),
                point_ledger_entries::id.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let entries = rows
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(entries, row_count(total)?, page))
    }
}
