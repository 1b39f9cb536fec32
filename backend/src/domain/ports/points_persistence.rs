//! Shared persistence error and transaction boundary for the points stores.
//!
//! The ledger, reward catalogue and redemption stores all operate on one
//! transaction handle so a redemption's three writes commit or roll back
//! together. [`UnitOfWork`] opens and closes that handle; the stores borrow
//! it mutably for each statement.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by points persistence adapters.
    pub enum PointsPersistenceError {
        /// Connection could not be established or was lost.
        Connection { message: String } =>
            "points store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "points store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } =>
            "points store write conflicted: {message}",
    }
}

/// Port opening and closing the transaction shared by the points stores.
///
/// Dropping a transaction without committing it must discard its writes and
/// release every lock it holds.
#[cfg_attr(test, mockall::automock(type Transaction = ();))]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Adapter-specific transaction handle.
    type Transaction: Send;

    /// Open a new transaction.
    async fn begin(&self) -> Result<Self::Transaction, PointsPersistenceError>;

    /// Make every write in `transaction` durable and release its locks.
    async fn commit(&self, transaction: Self::Transaction) -> Result<(), PointsPersistenceError>;

    /// Discard every write in `transaction` and release its locks.
    async fn rollback(&self, transaction: Self::Transaction)
    -> Result<(), PointsPersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn conflict_formats_message() {
        let err = PointsPersistenceError::conflict("redemption_code already exists");
        assert_eq!(
            err.to_string(),
            "points store write conflicted: redemption_code already exists"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn mock_unit_of_work_hands_out_unit_transactions() {
        let mut uow = MockUnitOfWork::new();
        uow.expect_begin().times(1).return_once(|| Ok(()));
        uow.expect_commit().times(1).return_once(|()| Ok(()));

        let tx = uow.begin().await.expect("begin succeeds");
        uow.commit(tx).await.expect("commit succeeds");
    }
}
