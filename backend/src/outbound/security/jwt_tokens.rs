//! HS256 bearer tokens for the `token` auth mode.
//!
//! Expiry is checked against the injected [`Clock`] rather than the system
//! time so tests can move time forward.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{TokenError, TokenService};

/// Lifetime of an issued token, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Shortest signing secret accepted at start-up.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when `secret` is shorter than
    /// [`MIN_SECRET_BYTES`].
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::signing(format!(
                "secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            clock,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| TokenError::signing(error.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|error| TokenError::invalid(error.to_string()))?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        data.claims
            .sub
            .parse()
            .map_err(|_| TokenError::invalid("subject is not a user id"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mockable::{DefaultClock, MockClock};
    use rstest::rstest;

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn clock_at(times: Vec<chrono::DateTime<Utc>>) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        let mut ticks = times.into_iter();
        clock
            .expect_utc()
            .returning(move || ticks.next().unwrap_or_else(Utc::now));
        Arc::new(clock)
    }

    #[test]
    fn issued_token_names_the_user() {
        let service = JwtTokenService::new(SECRET, Arc::new(DefaultClock)).expect("service");
        let user = UserId::random();
        let token = service.issue(user).expect("issue");
        assert_eq!(service.verify(&token).expect("verify"), user);
    }

    #[rstest]
    #[case::just_before(Duration::days(7) - Duration::seconds(1), true)]
    #[case::at_expiry(Duration::days(7), false)]
    #[case::later(Duration::days(30), false)]
    fn tokens_expire_after_seven_days(#[case] elapsed: Duration, #[case] valid: bool) {
        let issued = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("date");
        let service = JwtTokenService::new(SECRET, clock_at(vec![issued, issued + elapsed]))
            .expect("service");
        let token = service.issue(UserId::random()).expect("issue");

        let result = service.verify(&token);
        if valid {
            assert!(result.is_ok());
        } else {
            assert_eq!(result, Err(TokenError::Expired));
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other_secret = [b'f'; MIN_SECRET_BYTES];
        let other =
            JwtTokenService::new(&other_secret, Arc::new(DefaultClock)).expect("service");
        let token = other.issue(UserId::random()).expect("issue");
        let service = JwtTokenService::new(SECRET, Arc::new(DefaultClock)).expect("service");

        assert!(matches!(service.verify(&token), Err(TokenError::Invalid { .. })));
    }

    #[test]
    fn garbage_is_invalid() {
        let service = JwtTokenService::new(SECRET, Arc::new(DefaultClock)).expect("service");
        assert!(matches!(service.verify("not.a.jwt"), Err(TokenError::Invalid { .. })));
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(JwtTokenService::new(b"short", Arc::new(DefaultClock)).is_err());
    }
}
