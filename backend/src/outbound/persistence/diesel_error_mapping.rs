//! Diesel and pool error mapping for the points stores.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::PointsPersistenceError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> PointsPersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    PointsPersistenceError::connection(message)
}

/// Map Diesel failures onto the shared persistence error.
///
/// Unique violations become conflicts so a duplicate redemption code reaches
/// the caller as such; everything else is a query or connection failure.
pub(crate) fn map_diesel_error(error: DieselError) -> PointsPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PointsPersistenceError::conflict(
                info.constraint_name()
                    .map_or_else(|| "unique constraint violated".to_owned(), |name| {
                        format!("unique constraint {name} violated")
                    }),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PointsPersistenceError::connection("database connection closed")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            PointsPersistenceError::query("transaction could not be serialised")
        }
        DieselError::NotFound => PointsPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PointsPersistenceError::query("database query error"),
        DieselError::BrokenTransactionManager => {
            PointsPersistenceError::connection("transaction manager is broken")
        }
        _ => PointsPersistenceError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("reward_redemptions")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    fn unique_violation_names_constraint() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some("reward_redemptions_redemption_code_key"),
        ));
        assert_eq!(
            err,
            PointsPersistenceError::conflict(
                "unique constraint reward_redemptions_redemption_code_key violated"
            )
        );
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::ClosedConnection, None), true)]
    #[case(database_error(DatabaseErrorKind::CheckViolation, None), false)]
    #[case(DieselError::NotFound, false)]
    fn connection_failures_are_distinguished(#[case] error: DieselError, #[case] connection: bool) {
        let mapped = map_diesel_error(error);
        assert_eq!(
            matches!(mapped, PointsPersistenceError::Connection { .. }),
            connection
        );
    }

    #[rstest]
    fn pool_errors_are_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, PointsPersistenceError::connection("timed out"));
    }
}
