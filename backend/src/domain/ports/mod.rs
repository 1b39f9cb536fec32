//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Store`, [`UnitOfWork`]) share one associated
//! `Transaction` type per adapter family so services can compose their writes
//! atomically. Driving ports (`*Command`, `*Query`) are what inbound adapters
//! call.

mod macros;
pub(crate) use macros::define_port_error;

mod ledger_store;
mod points_ledger_command;
mod points_ledger_query;
mod points_persistence;
mod redemption_command;
mod redemption_query;
mod redemption_store;
mod reward_catalog_store;

#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use ledger_store::LedgerStore;
#[cfg(test)]
pub use points_ledger_command::MockPointsLedgerCommand;
pub use points_ledger_command::{
    AwardPointsRequest, FixturePointsLedgerCommand, PointsLedgerCommand, manual_award_reference,
};
#[cfg(test)]
pub use points_ledger_query::MockPointsLedgerQuery;
pub use points_ledger_query::{FixturePointsLedgerQuery, PointsBalance, PointsLedgerQuery};
#[cfg(test)]
pub use points_persistence::MockUnitOfWork;
pub use points_persistence::{PointsPersistenceError, UnitOfWork};
#[cfg(test)]
pub use redemption_command::MockRedemptionCommand;
pub use redemption_command::{
    FIXTURE_POINTS_COST, FixtureRedemptionCommand, RedeemRewardRequest, RedemptionCommand,
    UpdateRedemptionStatusRequest,
};
#[cfg(test)]
pub use redemption_query::MockRedemptionQuery;
pub use redemption_query::{FixtureRedemptionQuery, ListRedemptionsRequest, RedemptionQuery};
#[cfg(test)]
pub use redemption_store::MockRedemptionStore;
pub use redemption_store::RedemptionStore;
#[cfg(test)]
pub use reward_catalog_store::MockRewardCatalogStore;
pub use reward_catalog_store::RewardCatalogStore;
