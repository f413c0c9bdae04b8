//! User accounts and the validated values they are built from.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Minimum allowed username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed username length.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed email length.
pub const EMAIL_MAX: usize = 254;
/// Locale applied when registration omits one.
pub const DEFAULT_LOCALE: &str = "en";

/// Validation errors for user-supplied account fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("username may only contain letters, numbers, or underscores")]
    UsernameCharacters,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("locale must be a language tag such as `en` or `pt-BR`")]
    InvalidLocale,
    #[error("unknown plan `{0}`")]
    UnknownPlan(String),
    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static LOCALE_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("pattern {pattern} failed: {error}"))
    })
}

/// Unique login name.
///
/// # Examples
/// ```
/// use study_assistant::domain::Username;
///
/// assert!(Username::new("ada_l").is_ok());
/// assert!(Username::new("a").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        let length = value.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !compiled(&USERNAME_RE, "^[A-Za-z0-9_]+$").is_match(value) {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the username text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact address, stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        if value.is_empty()
            || value.len() > EMAIL_MAX
            || value
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value.to_lowercase()))
    }

    /// Borrow the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Preferred interface and tutoring language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Validate and construct a locale tag.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        if !compiled(&LOCALE_RE, "^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").is_match(value)
            || value.len() > 16
        {
            return Err(UserValidationError::InvalidLocale);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the locale tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(DEFAULT_LOCALE.to_owned())
    }
}

/// Subscription plan attached to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}

impl FromStr for Plan {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            other => Err(UserValidationError::UnknownPlan(other.to_owned())),
        }
    }
}

/// Authorisation role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Values needed to create an account. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub plan: Plan,
    pub role: UserRole,
    pub locale: Locale,
}

/// Partial profile change applied by [`crate::domain::ports::UserRepository::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<EmailAddress>,
    pub locale: Option<Locale>,
}

impl UserChanges {
    /// Whether the change set carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.locale.is_none()
    }
}

/// Registered account.
///
/// The password hash is an Argon2 PHC string and never leaves the server;
/// HTTP adapters expose a projection without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    password_hash: String,
    plan: Plan,
    role: UserRole,
    locale: Locale,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a stored user from its persisted parts.
    pub fn from_parts(id: UserId, draft: NewUser, created_at: DateTime<Utc>) -> Self {
        let NewUser {
            username,
            email,
            password_hash,
            plan,
            role,
            locale,
        } = draft;
        Self {
            id,
            username,
            email,
            password_hash,
            plan,
            role,
            locale,
            created_at,
        }
    }

    /// Apply a profile change in place.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(locale) = changes.locale {
            self.locale = locale;
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the user may call administrative endpoints.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
