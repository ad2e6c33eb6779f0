//! # API Module
//!
//! HTTP endpoints of the local server that stands in for the browser callback
//! route during `sporlist auth`.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives `code`, `state` (or `error`) from Spotify's
//!   authorization redirect, checks the anti-CSRF state and completes the
//!   PKCE exchange through [`crate::spotify::SpotifyAuth::complete_login`].
//! - [`health`] - Returns status and version for quick liveness checks.
//!
//! The router itself lives in [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
