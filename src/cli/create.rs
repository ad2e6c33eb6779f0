use crate::{error, info, success, types::NewPlaylist, warning};

use super::{connect_or_exit, spinner};

pub async fn create(
    name: String,
    description: Option<String>,
    public: bool,
    collaborative: bool,
    sources: Vec<String>,
) {
    let client = connect_or_exit().await;
    let mut uris: Vec<String> = Vec::new();

    for source in &sources {
        info!("Gather items of playlist {}", source);

        let pb = spinner("Fetching playlist items...");
        let result = client.get_playlist_items(source).await;
        pb.finish_and_clear();

        match result {
            Ok(items) => {
                let before = uris.len();
                // local files cannot be added through the API
                uris.extend(
                    items
                        .into_iter()
                        .filter(|item| !item.is_local)
                        .filter_map(|item| item.track)
                        .map(|track| track.uri().to_string()),
                );
                success!("{} items taken from {}", uris.len() - before, source);
            }
            Err(e) => error!("Cannot load playlist {}. Err: {}", source, e),
        }
    }

    if uris.is_empty() && !sources.is_empty() {
        warning!("Source playlists are empty, creating an empty playlist.");
    }

    let playlist = NewPlaylist {
        name: name.clone(),
        description: description.unwrap_or_default(),
        public,
        collaborative,
        uris,
    };

    info!("Create playlist {}", name);
    let pb = spinner("Creating playlist...");
    let result = client.create_playlist(&playlist).await;
    pb.finish_and_clear();

    match result {
        Ok(created) => success!(
            "Playlist {} created with {} items (id {})",
            created.name,
            playlist.uris.len(),
            created.id
        ),
        Err(e) => error!("Cannot create playlist {}. Err: {}", name, e),
    }
}
