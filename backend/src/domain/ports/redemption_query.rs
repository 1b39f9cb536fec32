//! Driving port for redemption reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, RedemptionFilter, RedemptionId, RedemptionRecord};

/// Request to list redemptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRedemptionsRequest {
    pub filter: RedemptionFilter,
    pub page: PageRequest,
}

/// Driving port for read-only redemption lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionQuery: Send + Sync {
    /// Fetch one redemption.
    async fn get_by_id(&self, id: RedemptionId) -> Result<RedemptionRecord, Error>;

    /// List redemptions matching the request's filter, newest first.
    async fn list(&self, request: ListRedemptionsRequest) -> Result<Page<RedemptionRecord>, Error>;
}

/// Fixture implementation with no stored redemptions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRedemptionQuery;

#[async_trait]
impl RedemptionQuery for FixtureRedemptionQuery {
    async fn get_by_id(&self, id: RedemptionId) -> Result<RedemptionRecord, Error> {
        Err(Error::not_found(format!("redemption {id} not found")))
    }

    async fn list(&self, _request: ListRedemptionsRequest) -> Result<Page<RedemptionRecord>, Error> {
        Ok(Page::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_list_is_empty() {
        let page = FixtureRedemptionQuery
            .list(ListRedemptionsRequest::default())
            .await
            .expect("fixture list succeeds");
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }
}
