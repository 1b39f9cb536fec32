//! Explicit PostgreSQL transactions shared by the Diesel points stores.
//!
//! A [`DieselTransaction`] owns one pooled connection with an open
//! transaction. The stores run their statements on it; the unit of work
//! commits or rolls it back. Dropping it without either returns the
//! connection to the pool mid-transaction, which the pool treats as broken
//! and discards, so the server rolls the transaction back.

use async_trait::async_trait;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tracing::debug;

use crate::domain::ports::{PointsPersistenceError, UnitOfWork};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, OwnedConnection};

type PgTransactionManager = AnsiTransactionManager;

/// Open transaction on an owned pooled connection.
pub struct DieselTransaction {
    connection: OwnedConnection,
}

impl DieselTransaction {
    pub(crate) fn connection(&mut self) -> &mut AsyncPgConnection {
        &mut self.connection
    }
}

/// Diesel-backed [`UnitOfWork`].
#[derive(Clone)]
pub struct DieselUnitOfWork {
    pool: DbPool,
}

impl DieselUnitOfWork {
    /// Create a unit of work drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for DieselUnitOfWork {
    type Transaction = DieselTransaction;

    async fn begin(&self) -> Result<Self::Transaction, PointsPersistenceError> {
        let mut connection = self.pool.get_owned().await.map_err(map_pool_error)?;
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::begin_transaction(
            &mut *connection,
        )
        .await
        .map_err(map_diesel_error)?;
        debug!("database transaction opened");
        Ok(DieselTransaction { connection })
    }

    async fn commit(&self, mut transaction: Self::Transaction) -> Result<(), PointsPersistenceError> {
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::commit_transaction(
            transaction.connection(),
        )
        .await
        .map_err(map_diesel_error)
    }

    async fn rollback(
        &self,
        mut transaction: Self::Transaction,
    ) -> Result<(), PointsPersistenceError> {
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            transaction.connection(),
        )
        .await
        .map_err(map_diesel_error)
    }
}
