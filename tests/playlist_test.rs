mod common;

use serde_json::{Value, json};
use sporlist::{
    spotify::playlist::ADD_TRACKS_CHUNK_SIZE,
    types::{NewPlaylist, PlayableItem},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

use common::*;

fn track_uris(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("spotify:track:{i}")).collect()
}

async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "display_name": "Test User"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_playlist_adds_tracks_in_chunks() {
    let server = MockServer::start().await;
    mount_me(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/users/user-1/playlists"))
        .and(body_json(json!({
            "name": "Mix",
            "description": "made by a test",
            "public": false,
            "collaborative": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-playlist",
            "name": "Mix",
            "public": false,
            "collaborative": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/playlists/new-playlist/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "snap" })))
        .expect(3)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let uris = track_uris(250);
    let created = h
        .client
        .create_playlist(&NewPlaylist {
            name: "Mix".to_string(),
            description: "made by a test".to_string(),
            public: false,
            collaborative: true,
            uris: uris.clone(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, "new-playlist");

    let chunks: Vec<Vec<String>> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v1/playlists/new-playlist/tracks")
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            serde_json::from_value(body["uris"].clone()).unwrap()
        })
        .collect();

    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![ADD_TRACKS_CHUNK_SIZE, ADD_TRACKS_CHUNK_SIZE, 50]);

    // Every URI exactly once, in order
    assert_eq!(chunks.concat(), uris);
}

#[tokio::test]
async fn test_create_playlist_without_tracks() {
    let server = MockServer::start().await;
    mount_me(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/users/user-1/playlists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "empty",
            "name": "Empty"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/playlists/empty/tracks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let created = h
        .client
        .create_playlist(&NewPlaylist {
            name: "Empty".to_string(),
            description: String::new(),
            public: true,
            collaborative: false,
            uris: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(created.name, "Empty");
}

#[tokio::test]
async fn test_add_tracks_exact_multiple() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "snap" })))
        .expect(2)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let snapshots = h.client.add_tracks("p1", &track_uris(200)).await.unwrap();

    assert_eq!(snapshots, vec!["snap", "snap"]);
}

#[tokio::test]
async fn test_search_playlists_drops_null_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("type", "playlist"))
        .and(query_param("q", "deep focus"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlists": {
                "href": "ignored",
                "items": [
                    { "id": "a", "name": "Deep Focus" },
                    null,
                    { "id": "b", "name": "Deeper Focus" }
                ],
                "next": "https://api.spotify.com/v1/search?offset=50",
                "total": 3,
                "limit": 50,
                "offset": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let playlists = h.client.search_playlists("deep focus").await.unwrap();

    let names: Vec<&str> = playlists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Deep Focus", "Deeper Focus"]);
}

#[tokio::test]
async fn test_get_playlist_items_reads_tracks_and_episodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "added_at": "2024-03-05T21:14:00Z",
                    "is_local": false,
                    "track": {
                        "type": "track",
                        "id": "t1",
                        "name": "Song",
                        "uri": "spotify:track:t1",
                        "duration_ms": 180000,
                        "artists": [{ "name": "Band" }, { "name": "Guest" }]
                    }
                },
                {
                    "added_at": "2024-03-06T10:00:00Z",
                    "is_local": false,
                    "track": {
                        "type": "episode",
                        "id": "e1",
                        "name": "Episode 1",
                        "uri": "spotify:episode:e1",
                        "show": { "id": "s1", "name": "The Show" }
                    }
                },
                { "added_at": null, "is_local": false, "track": null }
            ],
            "next": null
        })))
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let items = h.client.get_playlist_items("p1").await.unwrap();

    assert_eq!(items.len(), 3);

    let first = items[0].track.as_ref().unwrap();
    assert!(matches!(first, PlayableItem::Track(_)));
    assert_eq!(first.uri(), "spotify:track:t1");
    assert_eq!(first.creators(), "Band, Guest");

    let second = items[1].track.as_ref().unwrap();
    assert!(matches!(second, PlayableItem::Episode(_)));
    assert_eq!(second.name(), "Episode 1");
    assert_eq!(second.creators(), "The Show");

    assert!(items[2].track.is_none());
}
