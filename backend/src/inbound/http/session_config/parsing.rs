//! Value parsers shared by the session toggles.

use actix_web::cookie::SameSite;
use actix_web::cookie::time::Duration;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of hours";

/// A boolean toggle and the value debug builds fall back to.
pub(super) struct BoolEnvConfig {
    name: &'static str,
    default_value: bool,
}

impl BoolEnvConfig {
    pub(super) const fn new(name: &'static str, default_value: bool) -> Self {
        Self {
            name,
            default_value,
        }
    }
}

/// Parse a boolean toggle, then let `validate` veto the parsed value.
pub(super) fn parse_bool_env<E: Env, F>(
    env: &E,
    mode: BuildMode,
    config: BoolEnvConfig,
    validate: F,
) -> Result<bool, SessionConfigError>
where
    F: FnOnce(bool, BuildMode) -> Result<bool, SessionConfigError>,
{
    let BoolEnvConfig {
        name,
        default_value,
    } = config;
    let Some(value) = env.string(name) else {
        return debug_warn_or_error(
            mode,
            default_value,
            SessionConfigError::MissingEnv { name },
            || warn!(default = default_value, "{name} not set; using default"),
        );
    };
    match parse_bool(&value) {
        Some(flag) => validate(flag, mode),
        None => {
            let logged = value.clone();
            debug_warn_or_error(
                mode,
                default_value,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
                || warn!(value = %logged, default = default_value, "invalid {name}; using default"),
            )
        }
    }
}

/// Return `fallback` with a warning in debug builds, else `error`.
pub(super) fn debug_warn_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

pub(super) fn parse_same_site_value(
    value: String,
    mode: BuildMode,
    cookie_secure: bool,
    default_same_site: SameSite,
) -> Result<SameSite, SessionConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => debug_warn_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it"),
        ),
        _ => {
            let logged = value.clone();
            debug_warn_or_error(
                mode,
                default_same_site,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
                || warn!(value = %logged, "invalid SESSION_SAMESITE; using default"),
            )
        }
    }
}

/// Parse a whole number of hours greater than zero.
pub(super) fn parse_ttl(
    name: &'static str,
    value: String,
    mode: BuildMode,
    default_hours: i64,
) -> Result<Duration, SessionConfigError> {
    match value.trim().parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(Duration::hours(hours)),
        _ => {
            let logged = value.clone();
            debug_warn_or_error(
                mode,
                Duration::hours(default_hours),
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: TTL_EXPECTED,
                },
                || warn!(value = %logged, "invalid {name}; using default"),
            )
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
