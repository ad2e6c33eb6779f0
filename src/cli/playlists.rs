use tabled::Table;

use crate::{
    error, success,
    types::{Playlist, PlaylistTableRow},
    utils,
};

use super::{connect_or_exit, spinner};

pub async fn playlists() {
    let client = connect_or_exit().await;

    let pb = spinner("Fetching playlists...");
    let result = client.get_users_playlists().await;
    pb.finish_and_clear();

    match result {
        Ok(playlists) => {
            success!("Found {} playlists", playlists.len());
            println!("{}", playlist_table(playlists));
        }
        Err(e) => error!("Cannot load playlists. Err: {}", e),
    }
}

pub(super) fn playlist_table(playlists: Vec<Playlist>) -> Table {
    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: utils::truncate(&p.name, 48),
            owner: p
                .owner
                .and_then(|o| o.display_name.or(Some(o.id)))
                .unwrap_or_default(),
            tracks: p.tracks.map(|t| t.total).unwrap_or(0),
            id: p.id,
        })
        .collect();

    Table::new(rows)
}
