//! Application configuration loaded via OrthoConfig.
//!
//! Values come from defaults, an optional config file, `STUDY_*` environment
//! variables and CLI flags, in increasing precedence. Modes, the listen
//! address and limits carry defaults; accessors parse and validate.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use crate::outbound::ai::AiModels;
use crate::outbound::security::MIN_SECRET_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_AUTH_MODE: &str = "session";
const DEFAULT_STORAGE: &str = "memory";
const DEFAULT_AI_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// How requests prove who they come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Server-side session keyed by the `session` cookie.
    Session,
    /// HS256 bearer token in the `Authorization` header.
    Token,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "token" => Ok(Self::Token),
            _ => Err(ConfigError::invalid("auth_mode", value, "session|token")),
        }
    }
}

/// Where entities and sessions are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Memory,
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigError::invalid("storage", value, "memory|postgres")),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {field}='{value}'; expected {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{field} is required when {when}")]
    Missing {
        field: &'static str,
        when: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
            expected,
        }
    }
}

/// Raw settings as read by OrthoConfig.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STUDY")]
pub struct AppConfig {
    /// Listen address, `host:port`.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// `session` or `token`.
    #[ortho_config(default = String::from(DEFAULT_AUTH_MODE))]
    pub auth_mode: String,
    /// `memory` or `postgres`.
    #[ortho_config(default = String::from(DEFAULT_STORAGE))]
    pub storage: String,
    pub database_url: Option<String>,
    /// HS256 signing secret for token mode.
    pub token_secret: Option<String>,
    pub ai_api_key: Option<String>,
    #[ortho_config(default = String::from(DEFAULT_AI_BASE_URL))]
    pub ai_base_url: String,
    pub ai_chat_model: Option<String>,
    pub ai_vision_model: Option<String>,
    pub ai_reasoning_model: Option<String>,
    #[ortho_config(default = DEFAULT_AI_TIMEOUT_SECS)]
    pub ai_timeout_secs: u64,
    /// Upload ceiling in bytes.
    #[ortho_config(default = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid("bind_addr", self.bind_addr.as_str(), "host:port"))
    }

    /// # Errors
    ///
    /// Fails on anything other than `session` or `token`.
    pub fn auth_mode(&self) -> Result<AuthMode, ConfigError> {
        self.auth_mode.parse()
    }

    /// # Errors
    ///
    /// Fails on anything other than `memory` or `postgres`.
    pub fn storage(&self) -> Result<StorageMode, ConfigError> {
        self.storage.parse()
    }

    /// Database URL, required for postgres storage.
    ///
    /// # Errors
    ///
    /// Fails when unset or blank.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        non_blank(self.database_url.as_deref()).ok_or(ConfigError::Missing {
            field: "database_url",
            when: "storage is postgres",
        })
    }

    /// Token secret bytes, required in token mode.
    ///
    /// # Errors
    ///
    /// Fails when unset or shorter than the HS256 minimum.
    pub fn token_secret(&self) -> Result<&[u8], ConfigError> {
        let secret = non_blank(self.token_secret.as_deref()).ok_or(ConfigError::Missing {
            field: "token_secret",
            when: "auth_mode is token",
        })?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "token_secret",
                "<redacted>",
                "at least 32 bytes",
            ));
        }
        Ok(secret.as_bytes())
    }

    /// API key for the AI gateway; blank counts as absent.
    pub fn ai_api_key(&self) -> Option<String> {
        non_blank(self.ai_api_key.as_deref()).map(str::to_owned)
    }

    /// # Errors
    ///
    /// Fails when the URL does not parse.
    pub fn ai_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.ai_base_url.trim();
        Url::parse(raw).map_err(|_| ConfigError::invalid("ai_base_url", raw, "an absolute URL"))
    }

    pub fn ai_models(&self) -> AiModels {
        let defaults = AiModels::default();
        let pick = |value: &Option<String>, fallback: String| {
            non_blank(value.as_deref()).map_or(fallback, str::to_owned)
        };
        AiModels {
            chat: pick(&self.ai_chat_model, defaults.chat),
            vision: pick(&self.ai_vision_model, defaults.vision),
            reasoning: pick(&self.ai_reasoning_model, defaults.reasoning),
        }
    }

    pub fn ai_timeout(&self) -> Duration {
        match self.ai_timeout_secs {
            0 => Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        match self.max_upload_bytes {
            0 => DEFAULT_MAX_UPLOAD_BYTES,
            bytes => bytes,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
