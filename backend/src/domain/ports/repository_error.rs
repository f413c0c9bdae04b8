//! Error shared by every storage port.

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Failure raised by a repository adapter.
    pub enum RepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "repository connection failed: {message}",
        /// A query or mutation failed while executing.
        Query { message: String } => "repository query failed: {message}",
    }
}

/// Translate a storage failure into the domain error surfaced to clients.
///
/// Connection failures become `ServiceUnavailable`; everything else is an
/// internal error whose detail is redacted at the HTTP boundary.
pub(crate) fn map_repository_error(error: RepositoryError) -> Error {
    tracing::error!(error = %error, "repository call failed");
    match error {
        RepositoryError::Connection { message } => {
            Error::service_unavailable(format!("storage unavailable: {message}"))
        }
        RepositoryError::Query { message } => Error::internal(format!("storage error: {message}")),
    }
}
