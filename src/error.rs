//! Error types shared by the token store, the authorization flow and the
//! resilient request executor.

use thiserror::Error;

/// Failures of the persisted token store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store entry is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures while reading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Everything that can go wrong while talking to Spotify.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("code verifier not found, start the login again")]
    MissingVerifier,

    #[error("returned state does not match the stored login state")]
    StateMismatch,

    #[error("token exchange failed: {code} - {description}")]
    TokenExchange { code: String, description: String },

    #[error("access token or refresh token not found in token response")]
    MissingTokens,

    #[error("refresh token not found")]
    MissingRefreshToken,

    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    #[error("access token invalid, access was revoked")]
    AccessRevoked,

    #[error("request was still unauthorized after {attempts} token refreshes")]
    AuthLoop { attempts: u32 },

    #[error("rate limited, server asked to retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpotifyError::Timeout
        } else {
            SpotifyError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, SpotifyError>;
