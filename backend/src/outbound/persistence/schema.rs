//! Diesel table definitions for the points schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Redeemable catalogue items and their stock counters.
    reward_catalog_items (id) {
        id -> Uuid,
        name -> Varchar,
        /// Positive price in whole points.
        points_cost -> Int4,
        /// Remaining units; a CHECK keeps it non-negative.
        stock_quantity -> Int4,
        /// Soft-delete marker; deleted rows are never redeemed.
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only signed point movements.
    point_ledger_entries (id) {
        id -> Uuid,
        customer_id -> Uuid,
        /// Signed amount; negative for debits.
        amount -> Numeric,
        /// `CREDIT` or `DEBIT`, redundant with the sign for auditing.
        direction -> Varchar,
        description -> Text,
        reference_module -> Varchar,
        reference_id -> Uuid,
        reference_code -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Redemption records and their review status.
    reward_redemptions (id) {
        id -> Uuid,
        customer_id -> Uuid,
        reward_id -> Uuid,
        points_redeemed -> Int4,
        /// Globally unique `RDM-YYYYMMDD-XXXXXXXX` code.
        redemption_code -> Varchar,
        /// `PENDING`, `APPROVED` or `REJECTED`.
        status -> Varchar,
        redemption_date -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(reward_redemptions -> reward_catalog_items (reward_id));

diesel::allow_tables_to_appear_in_same_query!(
    point_ledger_entries,
    reward_catalog_items,
    reward_redemptions,
);
