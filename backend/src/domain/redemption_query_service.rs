//! Read-side service for redemption records.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;

use crate::domain::points_service_support::map_persistence_error;
use crate::domain::ports::{ListRedemptionsRequest, RedemptionQuery, RedemptionStore};
use crate::domain::{Error, RedemptionId, RedemptionRecord};

/// Service implementing [`RedemptionQuery`] over committed state.
#[derive(Clone)]
pub struct RedemptionQueryService<R> {
    redemptions: Arc<R>,
}

impl<R> RedemptionQueryService<R> {
    /// Create a new service reading from `redemptions`.
    pub fn new(redemptions: Arc<R>) -> Self {
        Self { redemptions }
    }
}

#[async_trait]
impl<R> RedemptionQuery for RedemptionQueryService<R>
where
    R: RedemptionStore,
{
    async fn get_by_id(&self, id: RedemptionId) -> Result<RedemptionRecord, Error> {
        self.redemptions
            .find_by_id(&id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("redemption {id} not found")))
    }

    async fn list(&self, request: ListRedemptionsRequest) -> Result<Page<RedemptionRecord>, Error> {
        self.redemptions
            .list(&request.filter, request.page)
            .await
            .map_err(map_persistence_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockRedemptionStore, PointsPersistenceError};
    use crate::domain::{
        CustomerId, ErrorCode, RedemptionCode, RedemptionFilter, RedemptionStatus, RewardId,
    };
    use chrono::Utc;
    use pagination::PageRequest;
    use rstest::rstest;

    fn record() -> RedemptionRecord {
        let now = Utc::now();
        RedemptionRecord::pending(
            CustomerId::random(),
            RewardId::random(),
            300,
            RedemptionCode::generate(now),
            now,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn get_by_id_returns_stored_record() {
        let stored = record();
        let expected = stored.clone();
        let mut store = MockRedemptionStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let found = RedemptionQueryService::new(Arc::new(store))
            .get_by_id(expected.id)
            .await
            .expect("record found");
        assert_eq!(found, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn get_by_id_reports_missing_records() {
        let mut store = MockRedemptionStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));

        let err = RedemptionQueryService::new(Arc::new(store))
            .get_by_id(RedemptionId::random())
            .await
            .expect_err("missing record");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn list_forwards_filter_and_window() {
        let customer_id = CustomerId::random();
        let mut store = MockRedemptionStore::new();
        store
            .expect_list()
            .withf(move |filter, page| {
                filter.customer_id == Some(customer_id)
                    && filter.status == Some(RedemptionStatus::Pending)
                    && page.limit() == 5
            })
            .returning(|_, _| Ok(Page::empty()));

        let page = RedemptionQueryService::new(Arc::new(store))
            .list(ListRedemptionsRequest {
                filter: RedemptionFilter {
                    customer_id: Some(customer_id),
                    status: Some(RedemptionStatus::Pending),
                },
                page: PageRequest::new(5, 0),
            })
            .await
            .expect("list succeeds");
        assert!(page.items.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn connection_loss_is_service_unavailable() {
        let mut store = MockRedemptionStore::new();
        store
            .expect_list()
            .returning(|_, _| Err(PointsPersistenceError::connection("pool exhausted")));

        let err = RedemptionQueryService::new(Arc::new(store))
            .list(ListRedemptionsRequest::default())
            .await
            .expect_err("store failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
