//! Configuration management for sporlist.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. All values are collected once into a [`Config`]
//! which is then handed to the authorization flow and the API client, so tests
//! can build a `Config` pointing at a mock server without touching the process
//! environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8888";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPES: &str = "playlist-read-private playlist-read-collaborative playlist-modify-public playlist-modify-private";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `sporlist/.env`.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/sporlist/.env`
/// - macOS: `~/Library/Application Support/sporlist/.env`
/// - Windows: `%LOCALAPPDATA%/sporlist/.env`
///
/// A missing file is not an error: every setting can also come from the
/// process environment.
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the application's directory inside the platform local data dir.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlist");
    path
}

/// Retry limits applied by the request executor.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// How many token refreshes a single logical request may trigger.
    pub max_auth_retries: u32,
    /// Delay used for a 429 response without a usable `Retry-After` header.
    pub default_rate_limit_delay: Duration,
    /// Length of one `Retry-After` unit. Spotify sends seconds.
    pub retry_after_unit: Duration,
    /// Largest `Retry-After` value the executor is willing to sleep for.
    pub max_retry_after: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_auth_retries: 3,
            default_rate_limit_delay: Duration::from_secs(1),
            retry_after_unit: Duration::from_secs(1),
            max_retry_after: 120,
        }
    }
}

/// Runtime configuration for the authorization flow, the API client and the
/// local callback server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Client ID obtained when registering the application with Spotify.
    pub client_id: String,
    /// Callback URL Spotify redirects to after authorization. Must match the
    /// redirect URI registered in the Spotify application settings.
    pub redirect_uri: String,
    /// Accounts host serving `/authorize` and `/api/token`.
    pub auth_url: String,
    /// Web API base, including the `/v1` prefix.
    pub api_url: String,
    /// Address the local callback server binds to.
    pub server_addr: String,
    /// Scopes requested during login.
    pub scopes: Vec<String>,
    /// Deadline applied to every single HTTP request.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    /// Builds a configuration with default endpoints for the given client.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: format!("{DEFAULT_BASE_URL}/callback"),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            scopes: parse_scopes(DEFAULT_SCOPES),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SPOTIFY_CLIENT_ID` | required |
    /// | `SPORLIST_BASE_URL` | `http://127.0.0.1:8888` (redirect URI is `{base}/callback`) |
    /// | `SERVER_ADDRESS` | `127.0.0.1:8888` |
    /// | `SPOTIFY_AUTH_URL` | `https://accounts.spotify.com` |
    /// | `SPOTIFY_API_URL` | `https://api.spotify.com/v1` |
    /// | `SPOTIFY_SCOPES` | playlist read and modify scopes |
    /// | `SPORLIST_REQUEST_TIMEOUT_SECS` | `30` |
    /// | `SPORLIST_MAX_AUTH_RETRIES` | `3` |
    /// | `SPORLIST_MAX_RETRY_AFTER_SECS` | `120` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the client ID is absent and
    /// [`ConfigError::Invalid`] when a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id =
            env::var("SPOTIFY_CLIENT_ID").map_err(|_| ConfigError::Missing("SPOTIFY_CLIENT_ID"))?;

        let mut config = Config::new(client_id);

        if let Ok(base_url) = env::var("SPORLIST_BASE_URL") {
            config.redirect_uri = format!("{}/callback", base_url.trim_end_matches('/'));
        }
        if let Ok(addr) = env::var("SERVER_ADDRESS") {
            config.server_addr = addr;
        }
        if let Ok(url) = env::var("SPOTIFY_AUTH_URL") {
            config.auth_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("SPOTIFY_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(scopes) = env::var("SPOTIFY_SCOPES") {
            config.scopes = parse_scopes(&scopes);
        }
        if let Some(secs) = parse_number("SPORLIST_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_number("SPORLIST_MAX_AUTH_RETRIES")? {
            config.retry.max_auth_retries = retries;
        }
        if let Some(secs) = parse_number("SPORLIST_MAX_RETRY_AFTER_SECS")? {
            config.retry.max_retry_after = secs;
        }

        Ok(config)
    }

    /// Token endpoint used for both grant types.
    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.auth_url)
    }

    /// Authorization endpoint the user is navigated to.
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.auth_url)
    }
}

/// Splits a scope string on whitespace or commas, dropping duplicates while
/// keeping the first-seen order.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::new();
    for scope in raw.split(|c: char| c.is_whitespace() || c == ',') {
        if !scope.is_empty() && !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }
    }
    scopes
}

fn parse_number<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => parse_value(var, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Parses the raw value of `var`, rejecting anything outside the range of `T`.
pub fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
