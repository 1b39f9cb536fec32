//! Internal Diesel row structs for the points schema.
//!
//! Rows never leave the persistence layer; conversions into domain types go
//! through the validating domain constructors and surface failures as query
//! errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::PointsPersistenceError;
use crate::domain::{
    CustomerId, LedgerEntry, LedgerEntryDraft, LedgerEntryId, LedgerReference, Points,
    RedemptionCode, RedemptionId, RedemptionRecord, RewardCatalogItem, RewardCatalogItemDraft,
    RewardId,
};

use super::schema::{point_ledger_entries, reward_catalog_items, reward_redemptions};

fn corrupt(what: &str, err: impl std::fmt::Display) -> PointsPersistenceError {
    PointsPersistenceError::query(format!("stored {what} is invalid: {err}"))
}

fn to_u32(value: i32, column: &str) -> Result<u32, PointsPersistenceError> {
    u32::try_from(value).map_err(|err| corrupt(column, err))
}

fn to_i32(value: u32, column: &str) -> Result<i32, PointsPersistenceError> {
    i32::try_from(value).map_err(|err| {
        PointsPersistenceError::query(format!("{column} does not fit the column: {err}"))
    })
}

// ---------------------------------------------------------------------------
// Reward catalogue
// ---------------------------------------------------------------------------

/// Row struct for reading from the reward_catalog_items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reward_catalog_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RewardCatalogItemRow {
    pub id: Uuid,
    pub name: String,
    pub points_cost: i32,
    pub stock_quantity: i32,
}

impl TryFrom<RewardCatalogItemRow> for RewardCatalogItem {
    type Error = PointsPersistenceError;

    fn try_from(row: RewardCatalogItemRow) -> Result<Self, Self::Error> {
        RewardCatalogItem::new(RewardCatalogItemDraft {
            id: RewardId::new(row.id).map_err(|err| corrupt("reward id", err))?,
            name: row.name,
            points_cost: to_u32(row.points_cost, "points_cost")?,
            stock_quantity: to_u32(row.stock_quantity, "stock_quantity")?,
        })
        .map_err(|err| corrupt("reward", err))
    }
}

/// Insertable struct for seeding catalogue rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reward_catalog_items)]
pub(crate) struct NewRewardCatalogItemRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub points_cost: i32,
    pub stock_quantity: i32,
}

impl<'a> TryFrom<&'a RewardCatalogItem> for NewRewardCatalogItemRow<'a> {
    type Error = PointsPersistenceError;

    fn try_from(item: &'a RewardCatalogItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *item.id().as_uuid(),
            name: item.name(),
            points_cost: to_i32(item.points_cost(), "points_cost")?,
            stock_quantity: to_i32(item.stock_quantity(), "stock_quantity")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Row struct for reading from the point_ledger_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = point_ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub direction: String,
    pub description: String,
    pub reference_module: String,
    pub reference_id: Uuid,
    pub reference_code: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LedgerEntryRow> for LedgerEntry {
    type Error = PointsPersistenceError;

    fn try_from(row: LedgerEntryRow) -> Result<Self, Self::Error> {
        LedgerEntry::new(LedgerEntryDraft {
            id: LedgerEntryId::new(row.id).map_err(|err| corrupt("ledger entry id", err))?,
            customer_id: CustomerId::new(row.customer_id)
                .map_err(|err| corrupt("customer id", err))?,
            amount: Points::new(row.amount),
            direction: row
                .direction
                .parse()
                .map_err(|err| corrupt("direction", err))?,
            description: row.description,
            reference: LedgerReference {
                module: row.reference_module,
                id: row.reference_id,
                code: row.reference_code,
            },
            created_at: row.created_at,
        })
        .map_err(|err| corrupt("ledger entry", err))
    }
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = point_ledger_entries)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub direction: &'a str,
    pub description: &'a str,
    pub reference_module: &'a str,
    pub reference_id: Uuid,
    pub reference_code: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a LedgerEntry> for NewLedgerEntryRow<'a> {
    fn from(entry: &'a LedgerEntry) -> Self {
        let reference = entry.reference();
        Self {
            id: *entry.id().as_uuid(),
            customer_id: *entry.customer_id().as_uuid(),
            amount: entry.amount().amount(),
            direction: entry.direction().as_str(),
            description: entry.description(),
            reference_module: reference.module.as_str(),
            reference_id: reference.id,
            reference_code: reference.code.as_str(),
            created_at: entry.created_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Redemptions
// ---------------------------------------------------------------------------

/// Row struct for reading from the reward_redemptions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reward_redemptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RedemptionRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reward_id: Uuid,
    pub points_redeemed: i32,
    pub redemption_code: String,
    pub status: String,
    pub redemption_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RedemptionRow> for RedemptionRecord {
    type Error = PointsPersistenceError;

    fn try_from(row: RedemptionRow) -> Result<Self, Self::Error> {
        Ok(RedemptionRecord {
            id: RedemptionId::new(row.id).map_err(|err| corrupt("redemption id", err))?,
            customer_id: CustomerId::new(row.customer_id)
                .map_err(|err| corrupt("customer id", err))?,
            reward_id: RewardId::new(row.reward_id).map_err(|err| corrupt("reward id", err))?,
            points_redeemed: to_u32(row.points_redeemed, "points_redeemed")?,
            redemption_code: RedemptionCode::parse(row.redemption_code)
                .map_err(|err| corrupt("redemption code", err))?,
            status: row.status.parse().map_err(|err| corrupt("status", err))?,
            redemption_date: row.redemption_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating redemption records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reward_redemptions)]
pub(crate) struct NewRedemptionRow<'a> {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reward_id: Uuid,
    pub points_redeemed: i32,
    pub redemption_code: &'a str,
    pub status: &'a str,
    pub redemption_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> TryFrom<&'a RedemptionRecord> for NewRedemptionRow<'a> {
    type Error = PointsPersistenceError;

    fn try_from(record: &'a RedemptionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *record.id.as_uuid(),
            customer_id: *record.customer_id.as_uuid(),
            reward_id: *record.reward_id.as_uuid(),
            points_redeemed: to_i32(record.points_redeemed, "points_redeemed")?,
            redemption_code: record.redemption_code.as_str(),
            status: record.status.as_str(),
            redemption_date: record.redemption_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Changeset applied by status updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reward_redemptions)]
pub(crate) struct RedemptionStatusUpdate<'a> {
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LedgerDirection, RedemptionStatus};
    use rstest::rstest;

    fn redemption_row() -> RedemptionRow {
        let now = Utc::now();
        RedemptionRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            reward_id: Uuid::new_v4(),
            points_redeemed: 100,
            redemption_code: "RDM-20261019-AB12CD34".to_owned(),
            status: "APPROVED".to_owned(),
            redemption_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn redemption_row_converts() {
        let record = RedemptionRecord::try_from(redemption_row()).expect("valid row");
        assert_eq!(record.status, RedemptionStatus::Approved);
        assert_eq!(record.points_redeemed, 100);
    }

    #[rstest]
    fn unknown_status_is_a_query_error() {
        let row = RedemptionRow {
            status: "CANCELLED".to_owned(),
            ..redemption_row()
        };
        let err = RedemptionRecord::try_from(row).expect_err("unknown status");
        assert!(matches!(err, PointsPersistenceError::Query { .. }));
    }

    #[rstest]
    fn negative_stock_is_a_query_error() {
        let row = RewardCatalogItemRow {
            id: Uuid::new_v4(),
            name: "Cap".to_owned(),
            points_cost: 10,
            stock_quantity: -1,
        };
        assert!(RewardCatalogItem::try_from(row).is_err());
    }

    #[rstest]
    fn ledger_row_with_mismatched_sign_is_rejected() {
        let row = LedgerEntryRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            amount: Decimal::new(50, 0),
            direction: LedgerDirection::Debit.as_str().to_owned(),
            description: "Redeemed cap".to_owned(),
            reference_module: "REDEEM".to_owned(),
            reference_id: Uuid::new_v4(),
            reference_code: "RDM-20261019-AB12CD34".to_owned(),
            created_at: Utc::now(),
        };
        assert!(LedgerEntry::try_from(row).is_err());
    }

    #[rstest]
    fn new_ledger_row_keeps_signed_amount() {
        let entry = LedgerEntry::debit(
            CustomerId::random(),
            Points::from(75_u32),
            "Redeemed cap",
            LedgerReference::redemption(Uuid::new_v4(), "RDM-20261019-AB12CD34"),
            Utc::now(),
        )
        .expect("valid debit");
        let row = NewLedgerEntryRow::from(&entry);
        assert_eq!(row.amount, Decimal::new(-75, 0));
        assert_eq!(row.direction, "DEBIT");
    }
}
