//! Port for the append-only points ledger.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{CustomerId, LedgerEntry, LedgerEntryId, Points};

use super::PointsPersistenceError;

/// Port for appending ledger entries and aggregating balances.
#[cfg_attr(test, mockall::automock(type Transaction = ();))]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Transaction handle shared with the other points stores.
    type Transaction: Send;

    /// Insert an immutable entry inside `transaction`.
    async fn append_entry(
        &self,
        transaction: &mut Self::Transaction,
        entry: &LedgerEntry,
    ) -> Result<LedgerEntryId, PointsPersistenceError>;

    /// Lock every ledger row of `customer_id` for the rest of `transaction`
    /// and return their sum.
    ///
    /// Blocks while another transaction holds the customer's ledger, so two
    /// concurrent spenders never both observe a pre-debit balance.
    async fn balance_for_update(
        &self,
        transaction: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError>;

    /// Unlocked balance for display. Never gates a debit.
    async fn balance_read_only(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Points, PointsPersistenceError>;

    /// Committed entries of `customer_id`, newest first.
    async fn list_entries(
        &self,
        customer_id: &CustomerId,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, PointsPersistenceError>;
}
