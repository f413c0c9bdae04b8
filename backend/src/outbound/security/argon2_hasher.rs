//! Argon2id implementation of the `CredentialHasher` port.
//!
//! Hashing runs on tokio's blocking pool so request workers are not stalled
//! by the memory-hard key derivation.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

fn hash_blocking(password: &str) -> Result<String, CredentialHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| CredentialHashError::hash(error.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, CredentialHashError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|error| CredentialHashError::malformed_hash(error.to_string()))?;
    if parsed.hash.is_none() {
        return Err(CredentialHashError::malformed_hash("stored hash has no output"));
    }
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(CredentialHashError::malformed_hash(error.to_string())),
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        let password = Zeroizing::new(password.to_owned());
        task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|error| CredentialHashError::hash(error.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|error| CredentialHashError::hash(error.to_string()))?
    }
}
