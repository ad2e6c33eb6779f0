//! # Spotify Integration Module
//!
//! This module is the integration layer between sporlist and the Spotify Web
//! API. It implements the OAuth 2.0 PKCE login, token refresh, a request
//! executor that recovers from expired tokens and rate limits, cursor
//! pagination, and the playlist operations built on top of them.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, callback server)
//!          ↓
//! API operations (playlists, search, user)
//!          ↓
//! Paginated list reducer
//!          ↓
//! Resilient request executor ──→ Token refresh
//!          ↓                          ↓
//! HTTP Layer (reqwest)           Token store
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication
//!
//! [`auth`] - [`SpotifyAuth`] drives the PKCE flow:
//! - **Login start**: generates state and code verifier, stores them, and
//!   navigates to the authorization page with the S256 challenge
//! - **Login completion**: exchanges the callback code plus stored verifier
//!   for an access and refresh token
//! - **Refresh**: trades the refresh token for a new access token, keeping
//!   the old refresh token when Spotify does not rotate it
//!
//! ### Request Executor
//!
//! [`client`] - [`SpotifyClient::execute`] sends a [`RequestDescriptor`] and
//! handles the response:
//! - **401**: refresh and resend, bounded by the configured retry limit
//! - **403**: wipe credentials and send the user back to login
//! - **429**: wait for `Retry-After` (1 second by default) and resend
//! - **Other errors**: surfaced as typed `Http` errors with the body
//!
//! Descriptors own their body bytes, so the same request can be replayed as
//! often as the policy requires.
//!
//! ### Pagination
//!
//! [`pagination`] - [`SpotifyClient::reduce_all_pages`] follows `next`
//! cursors one page at a time and folds every page into an accumulator.
//!
//! ### Playlist and User Operations
//!
//! [`playlist`] and [`user`]:
//! - `GET /me/playlists` - all playlists of the current user
//! - `GET /playlists/{id}/tracks` - all items of a playlist
//! - `GET /search?type=playlist` - playlist search (first 50 results)
//! - `GET /me` - current user profile
//! - `POST /users/{id}/playlists` and `POST /playlists/{id}/tracks` -
//!   playlist creation with track additions in chunks of 100
//!
//! ### Navigation
//!
//! [`navigation`] - the [`Navigator`] side effect used to send the user to
//! the authorization page, back to login, or to an error notice.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = Arc::new(TokenStore::open(FileBackend::default_location(), MemoryBackend::new()).await?);
//! let auth = Arc::new(SpotifyAuth::new(config, store, Arc::new(BrowserNavigator))?);
//! let client = SpotifyClient::new(auth)?;
//!
//! let playlists = client.get_users_playlists().await?;
//! ```

pub mod auth;
pub mod client;
pub mod navigation;
pub mod pagination;
pub mod playlist;
pub mod user;

pub use auth::SpotifyAuth;
pub use client::{RequestDescriptor, SpotifyClient};
pub use navigation::{BrowserNavigator, Navigation, Navigator};
