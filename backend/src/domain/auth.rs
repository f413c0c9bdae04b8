//! Authentication primitives: login credentials and registration requests.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a service. Passwords are
//! held in [`Zeroizing`] buffers so they are wiped when dropped.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Locale, UserValidationError, Username};

/// Minimum accepted password length for new accounts.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use study_assistant::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Field-level registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("{0}")]
    Username(UserValidationError),
    #[error("{0}")]
    Email(UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("{0}")]
    Locale(UserValidationError),
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
    locale: Locale,
}

impl Registration {
    /// Validate raw sign-up fields; a missing locale falls back to `en`.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        locale: Option<&str>,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username).map_err(RegistrationValidationError::Username)?;
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::Email)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let locale = match locale {
            Some(raw) => Locale::new(raw).map_err(RegistrationValidationError::Locale)?,
            None => Locale::default(),
        };
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
            locale,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}
