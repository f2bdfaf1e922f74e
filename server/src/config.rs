//! Server configuration parsed from environment variables.

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::services::auth::{self, StaticCredentials};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_CLIENT_BUFFER: usize = 256;
pub const DEFAULT_REGISTRY_BUFFER: usize = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub credentials: StaticCredentials,
    /// Per-session outbound queue depth.
    pub client_buffer: usize,
    /// Registry command queue depth.
    pub registry_buffer: usize,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Required:
    /// - `PLAYHOUSE_USERS`: comma-separated `name:sha256hex` pairs
    ///
    /// Optional:
    /// - `PLAYHOUSE_BIND`: default `127.0.0.1:3000`
    /// - `PLAYHOUSE_CLIENT_BUFFER`: default 256
    /// - `PLAYHOUSE_REGISTRY_BUFFER`: default 1024
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is unset or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("PLAYHOUSE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid { var: "PLAYHOUSE_BIND", reason: e.to_string() })?;

        let users = lookup("PLAYHOUSE_USERS").ok_or(ConfigError::Missing { var: "PLAYHOUSE_USERS" })?;
        let credentials = StaticCredentials::new(parse_users(&users)?);
        if credentials.is_empty() {
            return Err(ConfigError::Invalid { var: "PLAYHOUSE_USERS", reason: "no users configured".into() });
        }

        let client_buffer = parse_buffer("PLAYHOUSE_CLIENT_BUFFER", lookup("PLAYHOUSE_CLIENT_BUFFER"), DEFAULT_CLIENT_BUFFER)?;
        let registry_buffer =
            parse_buffer("PLAYHOUSE_REGISTRY_BUFFER", lookup("PLAYHOUSE_REGISTRY_BUFFER"), DEFAULT_REGISTRY_BUFFER)?;

        Ok(Self { bind, credentials, client_buffer, registry_buffer })
    }
}

/// Parse `name:digest,name:digest`. Whitespace around entries is ignored.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] on a malformed entry, a digest that is
/// not 64 hex characters, or a duplicate name.
pub fn parse_users(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { var: "PLAYHOUSE_USERS", reason };

    let mut users = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, digest) = entry.split_once(':').ok_or_else(|| invalid(format!("entry '{entry}' has no ':'")))?;
        let (name, digest) = (name.trim(), digest.trim());
        if name.is_empty() {
            return Err(invalid(format!("entry '{entry}' has an empty name")));
        }
        if !auth::is_digest(digest) {
            return Err(invalid(format!("digest for '{name}' is not 64 hex characters")));
        }
        if users.insert(name.to_owned(), digest.to_owned()).is_some() {
            return Err(invalid(format!("user '{name}' listed twice")));
        }
    }
    Ok(users)
}

// Channels cannot have zero capacity.
fn parse_buffer(var: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid { var, reason: "must be at least 1".into() }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
