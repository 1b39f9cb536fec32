//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the points ports backed
//! by PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: store implementations only translate between Diesel
//!   rows and domain types. Balance checks and status rules live in the
//!   domain services.
//! - **Shared transaction**: [`DieselUnitOfWork`] opens a
//!   [`DieselTransaction`] that every store borrows, so one redemption is one
//!   database transaction.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: all database errors are mapped to
//!   [`crate::domain::ports::PointsPersistenceError`].
//!
//! # Example
//!
//! ```no_run
//! use rewards_backend::outbound::persistence::{
//!     DbPool, DieselLedgerStore, DieselUnitOfWork, PoolConfig,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rewards")).await?;
//! let unit_of_work = DieselUnitOfWork::new(pool.clone());
//! let ledger = DieselLedgerStore::new(pool);
//! # let _ = (unit_of_work, ledger);
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_ledger_store;
mod diesel_redemption_store;
mod diesel_reward_catalog_store;
mod diesel_unit_of_work;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_store::DieselLedgerStore;
pub use diesel_redemption_store::DieselRedemptionStore;
pub use diesel_reward_catalog_store::DieselRewardCatalogStore;
pub use diesel_unit_of_work::{DieselTransaction, DieselUnitOfWork};
pub use migrations::{MIGRATIONS, run_pending_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
