use tabled::Table;

use crate::{error, success, types::PlaylistItemTableRow, utils};

use super::{connect_or_exit, spinner};

pub async fn tracks(playlist_id: String) {
    let client = connect_or_exit().await;

    let pb = spinner("Fetching playlist items...");
    let result = client.get_playlist_items(&playlist_id).await;
    pb.finish_and_clear();

    let items = match result {
        Ok(items) => items,
        Err(e) => error!("Cannot load playlist {}. Err: {}", playlist_id, e),
    };

    success!("Playlist {} has {} items", playlist_id, items.len());

    // items whose track was removed from Spotify come back as null
    let rows: Vec<PlaylistItemTableRow> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            item.track.as_ref().map(|track| PlaylistItemTableRow {
                position: i + 1,
                name: utils::truncate(track.name(), 48),
                by: utils::truncate(&track.creators(), 32),
                added: utils::format_date(item.added_at.as_deref()),
                uri: track.uri().to_string(),
            })
        })
        .collect();

    println!("{}", Table::new(rows));
}
