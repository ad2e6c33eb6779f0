use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiListPage<T> {
    #[serde(default)]
    pub href: Option<String>,
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Body returned by the token endpoint for both grant types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub uri: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksRef {
    pub href: Option<String>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    pub snapshot_id: Option<String>,
    pub owner: Option<User>,
    pub tracks: Option<TracksRef>,
    pub images: Option<Vec<Image>>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    #[serde(default)]
    pub is_local: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub release_date: Option<String>,
    pub show: Option<Show>,
}

/// Anything that can sit in a playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayableItem {
    Track(Track),
    Episode(Episode),
}

impl PlayableItem {
    pub fn uri(&self) -> &str {
        match self {
            PlayableItem::Track(track) => &track.uri,
            PlayableItem::Episode(episode) => &episode.uri,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PlayableItem::Track(track) => &track.name,
            PlayableItem::Episode(episode) => &episode.name,
        }
    }

    /// Artist names for tracks, the show name for episodes.
    pub fn creators(&self) -> String {
        match self {
            PlayableItem::Track(track) => track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            PlayableItem::Episode(episode) => episode
                .show
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
        }
    }
}

/// Entry of `GET /playlists/{id}/tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<PlayableItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlaylistsResponse {
    pub playlists: ApiListPage<Option<Playlist>>,
}

/// Everything needed to create a playlist and fill it.
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: u64,
    pub id: String,
}

#[derive(Tabled)]
pub struct PlaylistItemTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub by: String,
    pub added: String,
    pub uri: String,
}
