//! Application configuration parsed from environment variables.

use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set (or is blank).
    #[error("missing required env var {var}")]
    Missing { var: String },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

/// Timeouts applied to the hosted backend HTTP client.
///
/// `request_secs = None` leaves reqwest's default (no overall timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub connect_secs: u64,
    pub request_secs: Option<u64>,
}

/// Connection details for the hosted data + auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL without trailing slash.
    pub url: String,
    /// Public (anon) API key.
    pub anon_key: String,
    pub timeouts: BackendTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub cookie_secure: bool,
    pub backend: BackendConfig,
    /// Name of a server-side function that toggles a like in one call.
    pub like_toggle_rpc: Option<String>,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: bool; inferred from `PUBLIC_URL` being `https://` when unset
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `LIKE_TOGGLE_RPC`: server-side toggle function name
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = required(&lookup, "SUPABASE_URL")?
            .trim_end_matches('/')
            .to_owned();
        let anon_key = required(&lookup, "SUPABASE_ANON_KEY")?;

        let port = match lookup("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::Invalid { var: "COOKIE_SECURE".into(), value: raw })?,
            None => lookup("PUBLIC_URL").is_some_and(|public| public.starts_with("https://")),
        };

        let connect_secs = match lookup("BACKEND_CONNECT_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("BACKEND_CONNECT_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };
        let request_secs = lookup("BACKEND_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_number::<u64>("BACKEND_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?;

        let like_toggle_rpc = lookup("LIKE_TOGGLE_RPC")
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        Ok(Self {
            port,
            cookie_secure,
            backend: BackendConfig { url, anon_key, timeouts: BackendTimeouts { connect_secs, request_secs } },
            like_toggle_rpc,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<String, ConfigError> {
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing { var: var.into() })
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { var: var.into(), value: raw.into() })
}

/// Parse a loose boolean (`1/true/yes/on`, `0/false/no/off`).
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
