//! Port for stateless bearer tokens.

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures raised while issuing or checking bearer tokens.
    pub enum TokenError {
        /// Signature, structure or subject is unusable.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// Signing a fresh token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies signed tokens naming a user.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
