//! Driving port for ledger reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use serde::Serialize;

use crate::domain::{CustomerId, Error, LedgerEntry, Points};

/// Display balance of one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalance {
    pub customer_id: CustomerId,
    pub balance: Points,
}

/// Driving port for balances and ledger history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsLedgerQuery: Send + Sync {
    /// Unlocked balance for display.
    async fn balance(&self, customer_id: CustomerId) -> Result<PointsBalance, Error>;

    /// Ledger history, newest first.
    async fn list_entries(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, Error>;
}

/// Fixture implementation reporting empty ledgers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePointsLedgerQuery;

#[async_trait]
impl PointsLedgerQuery for FixturePointsLedgerQuery {
    async fn balance(&self, customer_id: CustomerId) -> Result<PointsBalance, Error> {
        Ok(PointsBalance {
            customer_id,
            balance: Points::ZERO,
        })
    }

    async fn list_entries(
        &self,
        _customer_id: CustomerId,
        _page: PageRequest,
    ) -> Result<Page<LedgerEntry>, Error> {
        Ok(Page::empty())
    }
}
