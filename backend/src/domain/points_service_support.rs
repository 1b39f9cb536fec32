//! Internal helpers shared by the points services.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{PointsPersistenceError, UnitOfWork};

pub(crate) fn map_persistence_error(error: PointsPersistenceError) -> Error {
    match error {
        PointsPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("points store unavailable: {message}"))
        }
        PointsPersistenceError::Query { message } => {
            Error::internal(format!("points store error: {message}"))
        }
        PointsPersistenceError::Conflict { message } => {
            Error::conflict(format!("points store conflict: {message}"))
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error returned; the adapter
/// discards the transaction either way.
pub(crate) async fn finish_transaction<U, T>(
    unit_of_work: &U,
    transaction: U::Transaction,
    outcome: Result<T, Error>,
) -> Result<T, Error>
where
    U: UnitOfWork,
{
    match outcome {
        Ok(value) => {
            unit_of_work
                .commit(transaction)
                .await
                .map_err(map_persistence_error)?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = unit_of_work.rollback(transaction).await {
                warn!(
                    error = %rollback_error,
                    cause = %error,
                    "rollback failed; transaction discarded"
                );
            }
            Err(error)
        }
    }
}

/// Run `work` under an optional deadline.
///
/// On expiry the future is dropped together with any transaction it owns,
/// which discards uncommitted writes.
pub(crate) async fn within_deadline<T, F>(
    deadline: Option<Duration>,
    operation: &'static str,
    work: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    let Some(limit) = deadline else {
        return work.await;
    };
    match tokio::time::timeout(limit, work).await {
        Ok(outcome) => outcome,
        Err(_) => {
            let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, timeout_ms, "transaction deadline elapsed");
            Err(Error::service_unavailable(format!(
                "{operation} did not complete within {timeout_ms} ms"
            ))
            .with_details(serde_json::json!({ "timeoutMs": timeout_ms })))
        }
    }
}
