//! # CLI Module
//!
//! This module provides the command-line interface layer for sporlist. Each
//! command wires the configuration, the persisted token store and the
//! Spotify client together, then prints what the API returns.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`auth`] - Runs the PKCE login through the browser and the local
//!   callback server
//! - [`logout`] - Forgets the stored tokens
//!
//! ### Queries
//!
//! - [`me`] - Shows the profile the stored token belongs to
//! - [`playlists`] - Lists every playlist of the current user
//! - [`tracks`] - Lists every item of one playlist
//! - [`search`] - Searches public playlists
//!
//! ### Playlist Operations
//!
//! - [`create`] - Creates a playlist from the items of other playlists
//!
//! ## Error Handling
//!
//! Commands never return errors. Recoverable problems are printed with
//! `warning!`, fatal ones with `error!`, which exits the process. Token
//! expiry and rate limits are handled below this layer and never reach the
//! user unless retries are exhausted.
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporlist auth                                  # Log in with Spotify
//! sporlist playlists                             # Your playlists
//! sporlist tracks 37i9dQZF1DXcBWIGoYBM5M         # Items of a playlist
//! sporlist search "deep focus"                   # Find playlists
//! sporlist create --name Mix --from ID1 --from ID2
//! ```

mod auth;
mod create;
mod playlists;
mod search;
mod tracks;

pub use auth::auth;
pub use auth::logout;
pub use auth::me;
pub use create::create;
pub use playlists::playlists;
pub use search::search;
pub use tracks::tracks;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Res,
    config::Config,
    error,
    management::{FileBackend, MemoryBackend, TokenStore},
    spotify::{BrowserNavigator, SpotifyAuth, SpotifyClient},
};

/// Builds the client stack from the environment.
///
/// Tokens live in the cache file, the login handshake only in memory since
/// it never outlives the `auth` process.
pub async fn connect() -> Res<SpotifyClient> {
    let config = Config::from_env()?;
    let store = TokenStore::open(FileBackend::default_location(), MemoryBackend::new()).await?;
    let auth = SpotifyAuth::new(config, Arc::new(store), Arc::new(BrowserNavigator))?;
    Ok(SpotifyClient::new(Arc::new(auth))?)
}

async fn connect_or_exit() -> SpotifyClient {
    match connect().await {
        Ok(client) => client,
        Err(e) => error!("Cannot set up Spotify client. Err: {}", e),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
