//! Driving port for redemption mutations.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CustomerId, Error, RedemptionCode, RedemptionId, RedemptionRecord, RedemptionStatus, RewardId,
};

/// Request to exchange a customer's points for one unit of a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRewardRequest {
    pub customer_id: CustomerId,
    pub reward_id: RewardId,
}

/// Request to move a redemption to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRedemptionStatusRequest {
    pub redemption_id: RedemptionId,
    pub status: RedemptionStatus,
}

/// Driving port for redeeming rewards and reviewing redemptions.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), rewards_backend::domain::Error> {
/// use rewards_backend::domain::ports::{
///     FixtureRedemptionCommand, RedeemRewardRequest, RedemptionCommand,
/// };
/// use rewards_backend::domain::{CustomerId, RedemptionStatus, RewardId};
///
/// let command = FixtureRedemptionCommand;
/// let record = command
///     .redeem(RedeemRewardRequest {
///         customer_id: CustomerId::random(),
///         reward_id: RewardId::random(),
///     })
///     .await?;
/// assert_eq!(record.status, RedemptionStatus::Pending);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionCommand: Send + Sync {
    /// Debit the reward's cost, allocate one unit of stock and record a
    /// `PENDING` redemption, all or nothing.
    async fn redeem(&self, request: RedeemRewardRequest) -> Result<RedemptionRecord, Error>;

    /// Move a redemption to `request.status`, refunding points and stock on
    /// entry into `REJECTED`.
    async fn update_status(
        &self,
        request: UpdateRedemptionStatusRequest,
    ) -> Result<RedemptionRecord, Error>;
}

/// Fixture implementation for handler tests that do not exercise redemption.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRedemptionCommand;

/// Points cost reported by [`FixtureRedemptionCommand`].
pub const FIXTURE_POINTS_COST: u32 = 100;

#[async_trait]
impl RedemptionCommand for FixtureRedemptionCommand {
    async fn redeem(&self, request: RedeemRewardRequest) -> Result<RedemptionRecord, Error> {
        let now = Utc::now();
        Ok(RedemptionRecord::pending(
            request.customer_id,
            request.reward_id,
            FIXTURE_POINTS_COST,
            RedemptionCode::generate(now),
            now,
        ))
    }

    async fn update_status(
        &self,
        request: UpdateRedemptionStatusRequest,
    ) -> Result<RedemptionRecord, Error> {
        Err(Error::not_found(format!(
            "redemption {} not found",
            request.redemption_id
        )))
    }
}
