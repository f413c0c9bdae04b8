//! Credential hashing and bearer-token adapters.

mod argon2_hasher;
mod jwt_tokens;

pub use argon2_hasher::Argon2CredentialHasher;
pub use jwt_tokens::{JwtTokenService, MIN_SECRET_BYTES, TOKEN_TTL_DAYS};
