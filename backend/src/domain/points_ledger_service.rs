//! Points ledger domain service.
//!
//! Implements the ledger driving ports: crediting points for business events
//! and reading balances and history for display.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::points_service_support::{finish_transaction, map_persistence_error};
use crate::domain::ports::{
    AwardPointsRequest, LedgerStore, PointsBalance, PointsLedgerCommand, PointsLedgerQuery,
    UnitOfWork,
};
use crate::domain::{CustomerId, Error, LedgerEntry};

/// Ledger service implementing [`PointsLedgerCommand`] and
/// [`PointsLedgerQuery`].
#[derive(Clone)]
pub struct PointsLedgerService<U, L> {
    unit_of_work: Arc<U>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<U, L> PointsLedgerService<U, L> {
    /// Create a new service over the given stores.
    pub fn new(unit_of_work: Arc<U>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            unit_of_work,
            ledger,
            clock,
        }
    }
}

#[async_trait]
impl<U, L> PointsLedgerCommand for PointsLedgerService<U, L>
where
    U: UnitOfWork,
    L: LedgerStore<Transaction = U::Transaction>,
{
    async fn award_points(&self, request: AwardPointsRequest) -> Result<LedgerEntry, Error> {
        let entry = request.into_entry(self.clock.utc())?;

        let mut transaction = self
            .unit_of_work
            .begin()
            .await
            .map_err(map_persistence_error)?;
        let outcome = self
            .ledger
            .append_entry(&mut transaction, &entry)
            .await
            .map_err(map_persistence_error);
        finish_transaction(self.unit_of_work.as_ref(), transaction, outcome).await?;

        info!(
            entry_id = %entry.id(),
            customer_id = %entry.customer_id(),
            amount = %entry.amount(),
            reference_module = %entry.reference().module,
            "points awarded"
        );
        Ok(entry)
    }
}

#[async_trait]
impl<U, L> PointsLedgerQuery for PointsLedgerService<U, L>
where
    U: UnitOfWork,
    L: LedgerStore<Transaction = U::Transaction>,
{
    async fn balance(&self, customer_id: CustomerId) -> Result<PointsBalance, Error> {
        let balance = self
            .ledger
            .balance_read_only(&customer_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(PointsBalance {
            customer_id,
            balance,
        })
    }

    async fn list_entries(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, Error> {
        self.ledger
            .list_entries(&customer_id, page)
            .await
            .map_err(map_persistence_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockLedgerStore, MockUnitOfWork, PointsPersistenceError, manual_award_reference,
    };
    use crate::domain::{ErrorCode, LedgerReference, Points};
    use crate::domain::points_test_support::{fixture_clock, fixture_timestamp};
    use rstest::rstest;

    fn award(amount: u32) -> AwardPointsRequest {
        AwardPointsRequest {
            customer_id: CustomerId::random(),
            amount: Points::from(amount),
            description: "Referral bonus".to_owned(),
            reference: manual_award_reference("REF-42"),
        }
    }

    fn service(
        unit_of_work: MockUnitOfWork,
        ledger: MockLedgerStore,
    ) -> PointsLedgerService<MockUnitOfWork, MockLedgerStore> {
        PointsLedgerService::new(Arc::new(unit_of_work), Arc::new(ledger), fixture_clock())
    }

    #[rstest]
    #[tokio::test]
    async fn award_appends_credit_and_commits() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().times(1).returning(|| Ok(()));
        unit_of_work.expect_commit().times(1).returning(|_| Ok(()));
        unit_of_work.expect_rollback().never();
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_append_entry()
            .times(1)
            .withf(|_, entry| entry.amount() == Points::from(40_u32))
            .returning(|_, entry| Ok(entry.id()));

        let entry = service(unit_of_work, ledger)
            .award_points(award(40))
            .await
            .expect("award succeeds");

        assert_eq!(entry.created_at(), fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn award_rolls_back_when_append_fails() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().returning(|| Ok(()));
        unit_of_work.expect_commit().never();
        unit_of_work.expect_rollback().times(1).returning(|_| Ok(()));
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_append_entry()
            .returning(|_, _| Err(PointsPersistenceError::connection("socket closed")));

        let err = service(unit_of_work, ledger)
            .award_points(award(10))
            .await
            .expect_err("append failure surfaces");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_award_is_rejected_before_opening_a_transaction() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().never();
        let err = service(unit_of_work, MockLedgerStore::new())
            .award_points(award(0))
            .await
            .expect_err("zero award rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case::over_cap(award(1_000_000_001))]
    #[case::redemption_reference(AwardPointsRequest {
        reference: LedgerReference::redemption(uuid::Uuid::new_v4(), "RDM-20261019-7KQ2M9XD"),
        ..award(100)
    })]
    #[tokio::test]
    async fn refused_awards_never_reach_the_ledger(#[case] request: AwardPointsRequest) {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().never();
        let mut ledger = MockLedgerStore::new();
        ledger.expect_append_entry().never();

        let err = service(unit_of_work, ledger)
            .award_points(request)
            .await
            .expect_err("award refused");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn balance_reads_without_a_transaction() {
        let mut unit_of_work = MockUnitOfWork::new();
        unit_of_work.expect_begin().never();
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_balance_read_only()
            .returning(|_| Ok(Points::from(275_u32)));
        ledger.expect_balance_for_update().never();

        let customer_id = CustomerId::random();
        let balance = service(unit_of_work, ledger)
            .balance(customer_id)
            .await
            .expect("balance");
        assert_eq!(balance.customer_id, customer_id);
        assert_eq!(balance.balance, Points::from(275_u32));
    }

    #[rstest]
    #[tokio::test]
    async fn query_failures_become_internal_errors() {
        let mut ledger = MockLedgerStore::new();
        ledger
            .expect_list_entries()
            .returning(|_, _| Err(PointsPersistenceError::query("syntax error")));

        let err = service(MockUnitOfWork::new(), ledger)
            .list_entries(CustomerId::random(), PageRequest::default())
            .await
            .expect_err("query failure surfaces");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
