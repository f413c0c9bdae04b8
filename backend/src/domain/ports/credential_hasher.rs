//! Port for password hashing.
//!
//! Hashing is CPU-bound; adapters decide how to keep it off the async
//! executor.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing or verifying credentials.
    pub enum CredentialHashError {
        /// The password could not be hashed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash is not a valid PHC string.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted PHC-format hash of `password`.
    async fn hash(&self, password: &str) -> Result<String, CredentialHashError>;

    /// Check `password` against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`; only unusable hashes are errors.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError>;
}
