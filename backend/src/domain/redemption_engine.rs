//! Redemption engine: the orchestrator tying the ledger, the reward catalogue
//! and the redemption records together.
//!
//! Every operation runs inside one transaction opened through
//! [`UnitOfWork`]. Any failure rolls the whole transaction back, so a failed
//! redemption leaves stock, balance and the redemption table untouched.
//!
//! Lock order is fixed:
//! - `redeem` locks the reward row, then the customer's ledger.
//! - `update_status` locks the redemption row, then touches the reward.
//!
//! `redeem` never locks an existing redemption row, so the two orders cannot
//! form a cycle. New lock-taking operations must keep reward before ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::points_service_support::{
    finish_transaction, map_persistence_error, within_deadline,
};
use crate::domain::ports::{
    LedgerStore, RedeemRewardRequest, RedemptionCommand, RedemptionStore, RewardCatalogStore,
    UnitOfWork, UpdateRedemptionStatusRequest,
};
use crate::domain::{
    Error, LedgerEntry, LedgerReference, RedemptionCode, RedemptionId, RedemptionRecord, RewardId,
    StockUpdate,
};

/// Service implementing [`RedemptionCommand`] over the points stores.
///
/// # Examples
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use mockable::DefaultClock;
/// # use rewards_backend::domain::RedemptionEngine;
/// # use rewards_backend::outbound::memory::InMemoryPointsStore;
/// let store = Arc::new(InMemoryPointsStore::default());
/// let engine = RedemptionEngine::new(
///     store.clone(),
///     store.clone(),
///     store.clone(),
///     store,
///     Arc::new(DefaultClock),
/// );
/// # let _ = engine;
/// ```
pub struct RedemptionEngine<U, L, C, R> {
    unit_of_work: Arc<U>,
    ledger: Arc<L>,
    catalog: Arc<C>,
    redemptions: Arc<R>,
    clock: Arc<dyn Clock>,
    transaction_timeout: Option<Duration>,
}

impl<U, L, C, R> RedemptionEngine<U, L, C, R> {
    /// Create an engine with no transaction deadline.
    pub fn new(
        unit_of_work: Arc<U>,
        ledger: Arc<L>,
        catalog: Arc<C>,
        redemptions: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            unit_of_work,
            ledger,
            catalog,
            redemptions,
            clock,
            transaction_timeout: None,
        }
    }

    /// Bound every transaction by `timeout`; expiry rolls back and reports
    /// [`crate::domain::ErrorCode::ServiceUnavailable`].
    #[must_use]
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = Some(timeout);
        self
    }
}

impl<U, L, C, R> RedemptionEngine<U, L, C, R>
where
    U: UnitOfWork,
    L: LedgerStore<Transaction = U::Transaction>,
    C: RewardCatalogStore<Transaction = U::Transaction>,
    R: RedemptionStore<Transaction = U::Transaction>,
{
    async fn redeem_within(
        &self,
        transaction: &mut U::Transaction,
        request: RedeemRewardRequest,
    ) -> Result<RedemptionRecord, Error> {
        let RedeemRewardRequest {
            customer_id,
            reward_id,
        } = request;

        let reward = self
            .catalog
            .get_for_update(transaction, &reward_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("reward {reward_id} not found")))?;
        debug!(%reward_id, stock = reward.stock_quantity(), "reward row locked");

        if !reward.is_in_stock() {
            return Err(out_of_stock(&reward_id));
        }

        let balance = self
            .ledger
            .balance_for_update(transaction, &customer_id)
            .await
            .map_err(map_persistence_error)?;
        debug!(%customer_id, %balance, "customer ledger locked");

        if balance < reward.cost() {
            return Err(Error::insufficient_points(format!(
                "customer {customer_id} has {balance} points; reward costs {}",
                reward.points_cost()
            ))
            .with_details(json!({
                "balance": balance,
                "required": reward.cost(),
            })));
        }

        let now = self.clock.utc();
        let pending = RedemptionRecord::pending(
            customer_id,
            reward_id,
            reward.points_cost(),
            RedemptionCode::generate(now),
            now,
        );
        let record = self
            .redemptions
            .create(transaction, &pending)
            .await
            .map_err(map_persistence_error)?;

        let debit = LedgerEntry::debit(
            customer_id,
            record.points(),
            format!("Redeemed {}", reward.name()),
            reference_for(&record),
            now,
        )
        .map_err(|err| Error::internal(format!("invalid redemption debit: {err}")))?;
        self.ledger
            .append_entry(transaction, &debit)
            .await
            .map_err(map_persistence_error)?;

        match self
            .catalog
            .decrement_stock_if_positive(transaction, &reward_id)
            .await
            .map_err(map_persistence_error)?
        {
            StockUpdate::Applied => Ok(record),
            StockUpdate::NoMatchingRow => Err(out_of_stock(&reward_id)),
        }
    }

    async fn update_status_within(
        &self,
        transaction: &mut U::Transaction,
        request: UpdateRedemptionStatusRequest,
    ) -> Result<RedemptionRecord, Error> {
        let UpdateRedemptionStatusRequest {
            redemption_id,
            status,
        } = request;

        let current = self
            .redemptions
            .find_for_update(transaction, &redemption_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| redemption_not_found(&redemption_id))?;

        current.status.check_transition(status).map_err(|err| {
            Error::conflict(err.to_string()).with_details(json!({
                "from": err.from,
                "to": err.to,
            }))
        })?;

        let now = self.clock.utc();
        if current.status.requires_compensation(status) {
            self.compensate(transaction, &current, now).await?;
            debug!(
                %redemption_id,
                from = %current.status,
                points = current.points_redeemed,
                "compensation staged"
            );
        }

        self.redemptions
            .update(transaction, &current.with_status(status, now))
            .await
            .map_err(map_persistence_error)
    }

    async fn compensate(
        &self,
        transaction: &mut U::Transaction,
        record: &RedemptionRecord,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let credit = LedgerEntry::credit(
            record.customer_id,
            record.points(),
            format!("Refund for rejected redemption {}", record.redemption_code),
            reference_for(record),
            now,
        )
        .map_err(|err| Error::internal(format!("invalid redemption refund: {err}")))?;
        self.ledger
            .append_entry(transaction, &credit)
            .await
            .map_err(map_persistence_error)?;

        match self
            .catalog
            .increment_stock(transaction, &record.reward_id)
            .await
            .map_err(map_persistence_error)?
        {
            StockUpdate::Applied => Ok(()),
            StockUpdate::NoMatchingRow => Err(Error::internal(format!(
                "reward {} vanished while restoring stock",
                record.reward_id
            ))),
        }
    }
}

#[async_trait]
impl<U, L, C, R> RedemptionCommand for RedemptionEngine<U, L, C, R>
where
    U: UnitOfWork,
    L: LedgerStore<Transaction = U::Transaction>,
    C: RewardCatalogStore<Transaction = U::Transaction>,
    R: RedemptionStore<Transaction = U::Transaction>,
{
    async fn redeem(&self, request: RedeemRewardRequest) -> Result<RedemptionRecord, Error> {
        let outcome = within_deadline(self.transaction_timeout, "redeem", async {
            let mut transaction = self
                .unit_of_work
                .begin()
                .await
                .map_err(map_persistence_error)?;
            let outcome = self.redeem_within(&mut transaction, request).await;
            finish_transaction(self.unit_of_work.as_ref(), transaction, outcome).await
        })
        .await;

        match &outcome {
            Ok(record) => info!(
                redemption_id = %record.id,
                redemption_code = %record.redemption_code,
                customer_id = %record.customer_id,
                reward_id = %record.reward_id,
                points = record.points_redeemed,
                "reward redeemed"
            ),
            Err(error) if error.code().is_business_rule() => warn!(
                customer_id = %request.customer_id,
                reward_id = %request.reward_id,
                code = ?error.code(),
                "redemption refused: {error}"
            ),
            Err(error) => warn!(
                customer_id = %request.customer_id,
                reward_id = %request.reward_id,
                code = ?error.code(),
                "redemption failed: {error}"
            ),
        }
        outcome
    }

    async fn update_status(
        &self,
        request: UpdateRedemptionStatusRequest,
    ) -> Result<RedemptionRecord, Error> {
        self.redemptions
            .find_by_id(&request.redemption_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| redemption_not_found(&request.redemption_id))?;

        let outcome = within_deadline(self.transaction_timeout, "update_status", async {
            let mut transaction = self
                .unit_of_work
                .begin()
                .await
                .map_err(map_persistence_error)?;
            let outcome = self.update_status_within(&mut transaction, request).await;
            finish_transaction(self.unit_of_work.as_ref(), transaction, outcome).await
        })
        .await;

        match &outcome {
            Ok(record) => info!(
                redemption_id = %record.id,
                redemption_code = %record.redemption_code,
                status = %record.status,
                "redemption status updated"
            ),
            Err(error) => warn!(
                redemption_id = %request.redemption_id,
                to = %request.status,
                code = ?error.code(),
                "redemption status update failed: {error}"
            ),
        }
        outcome
    }
}

fn reference_for(record: &RedemptionRecord) -> LedgerReference {
    LedgerReference::redemption(*record.id.as_uuid(), record.redemption_code.as_str())
}

fn out_of_stock(reward_id: &RewardId) -> Error {
    Error::out_of_stock(format!("reward {reward_id} is out of stock"))
        .with_details(json!({ "rewardId": reward_id }))
}

fn redemption_not_found(id: &RedemptionId) -> Error {
    Error::not_found(format!("redemption {id} not found"))
}

#[cfg(test)]
#[path = "redemption_engine_tests.rs"]
mod tests;
