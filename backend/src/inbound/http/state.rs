//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixturePointsLedgerCommand, FixturePointsLedgerQuery, FixtureRedemptionCommand,
    FixtureRedemptionQuery, PointsLedgerCommand, PointsLedgerQuery, RedemptionCommand,
    RedemptionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Redeem and review redemptions.
    pub redemptions: Arc<dyn RedemptionCommand>,
    /// Read redemption records.
    pub redemptions_query: Arc<dyn RedemptionQuery>,
    /// Credit points to customers.
    pub points: Arc<dyn PointsLedgerCommand>,
    /// Read balances and ledger history.
    pub points_query: Arc<dyn PointsLedgerQuery>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rewards_backend::domain::ports::{
    ///     FixturePointsLedgerCommand, FixturePointsLedgerQuery, FixtureRedemptionCommand,
    ///     FixtureRedemptionQuery,
    /// };
    /// use rewards_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureRedemptionCommand),
    ///     Arc::new(FixtureRedemptionQuery),
    ///     Arc::new(FixturePointsLedgerCommand),
    ///     Arc::new(FixturePointsLedgerQuery),
    /// );
    /// let _redemptions = state.redemptions.clone();
    /// ```
    pub fn new(
        redemptions: Arc<dyn RedemptionCommand>,
        redemptions_query: Arc<dyn RedemptionQuery>,
        points: Arc<dyn PointsLedgerCommand>,
        points_query: Arc<dyn PointsLedgerQuery>,
    ) -> Self {
        Self {
            redemptions,
            redemptions_query,
            points,
            points_query,
        }
    }

    /// State backed entirely by fixtures, for handler tests and docs.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureRedemptionCommand),
            Arc::new(FixtureRedemptionQuery),
            Arc::new(FixturePointsLedgerCommand),
            Arc::new(FixturePointsLedgerQuery),
        )
    }
}
