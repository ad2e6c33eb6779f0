use crate::{error, success, warning};

use super::{connect_or_exit, playlists::playlist_table, spinner};

pub async fn search(query: String) {
    let client = connect_or_exit().await;

    let pb = spinner("Searching playlists...");
    let result = client.search_playlists(&query).await;
    pb.finish_and_clear();

    match result {
        Ok(playlists) if playlists.is_empty() => warning!("No playlists match \"{}\"", query),
        Ok(playlists) => {
            success!("{} playlists match \"{}\"", playlists.len(), query);
            println!("{}", playlist_table(playlists));
        }
        Err(e) => error!("Cannot search playlists. Err: {}", e),
    }
}
