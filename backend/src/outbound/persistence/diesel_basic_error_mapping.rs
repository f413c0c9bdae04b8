//! Shared Diesel error mapping onto the domain's [`RepositoryError`].

use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Pool failures are always connection problems.
pub(super) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors into connection or query failures.
///
/// Database messages are logged at debug level only; the returned error
/// carries a fixed description so SQL details never reach a response.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::UniqueViolation => RepositoryError::query("duplicate record"),
            DatabaseErrorKind::ForeignKeyViolation => {
                RepositoryError::query("referenced record does not exist")
            }
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection error")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}
