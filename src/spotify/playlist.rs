use reqwest::Url;
use tracing::debug;

use crate::{
    error::{Result, SpotifyError},
    spotify::client::{RequestDescriptor, SpotifyClient},
    types::{
        AddTracksRequest, CreatePlaylistRequest, NewPlaylist, Playlist, PlaylistItem,
        SearchPlaylistsResponse, SnapshotResponse,
    },
};

/// Most URIs Spotify accepts in one add-tracks call.
pub const ADD_TRACKS_CHUNK_SIZE: usize = 100;

/// Result size requested from the search endpoint.
pub const SEARCH_LIMIT: &str = "50";

impl SpotifyClient {
    /// Every playlist owned or followed by the current user.
    pub async fn get_users_playlists(&self) -> Result<Vec<Playlist>> {
        self.collect_all_pages(RequestDescriptor::get(self.endpoint("/me/playlists")))
            .await
    }

    /// Every item of a playlist, in playlist order.
    pub async fn get_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        let url = self.endpoint(&format!("/playlists/{playlist_id}/tracks"));
        self.collect_all_pages(RequestDescriptor::get(url)).await
    }

    /// First page of playlists matching `query`.
    ///
    /// Spotify may put `null` entries into search results, those are dropped.
    pub async fn search_playlists(&self, query: &str) -> Result<Vec<Playlist>> {
        let url = Url::parse_with_params(
            &self.endpoint("/search"),
            &[("type", "playlist"), ("q", query), ("limit", SEARCH_LIMIT)],
        )
        .map_err(|e| SpotifyError::InvalidUrl(e.to_string()))?;

        let response: SearchPlaylistsResponse = self
            .execute_json(&RequestDescriptor::get(url.as_str()))
            .await?;

        Ok(response.playlists.items.into_iter().flatten().collect())
    }

    /// Creates a playlist for the current user and fills it with `playlist.uris`.
    ///
    /// Looks up the user with `GET /me`, creates the playlist under
    /// `/users/{id}/playlists` and then adds the URIs in chunks of
    /// [`ADD_TRACKS_CHUNK_SIZE`].
    pub async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<Playlist> {
        let user = self.get_current_user().await?;

        let request = CreatePlaylistRequest {
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            public: playlist.public,
            collaborative: playlist.collaborative,
        };
        let descriptor =
            RequestDescriptor::post(self.endpoint(&format!("/users/{}/playlists", user.id)))
                .json(&request)?;
        let created: Playlist = self.execute_json(&descriptor).await?;
        debug!(playlist = %created.id, "playlist created");

        self.add_tracks(&created.id, &playlist.uris).await?;
        Ok(created)
    }

    /// Appends `uris` to a playlist, one request per chunk.
    ///
    /// Returns the snapshot id of every chunk in order.
    pub async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<Vec<String>> {
        let url = self.endpoint(&format!("/playlists/{playlist_id}/tracks"));
        let mut snapshots = Vec::new();

        for chunk in uris.chunks(ADD_TRACKS_CHUNK_SIZE) {
            let descriptor = RequestDescriptor::post(url.as_str()).json(&AddTracksRequest {
                uris: chunk.to_vec(),
            })?;
            let response: SnapshotResponse = self.execute_json(&descriptor).await?;
            debug!(playlist = playlist_id, added = chunk.len(), "tracks added");
            snapshots.push(response.snapshot_id);
        }

        Ok(snapshots)
    }
}
