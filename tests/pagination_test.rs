mod common;

use serde_json::{Value, json};
use sporlist::{
    SpotifyError,
    spotify::RequestDescriptor,
    types::{ApiListPage, Playlist},
};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{header, method, path},
};

use common::*;

// Helper function to create a playlist entry as the API returns it
fn playlist_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "description": "",
        "public": true,
        "collaborative": false,
        "snapshot_id": "snap",
        "owner": { "id": "user-1", "display_name": "Test User" },
        "tracks": { "href": null, "total": 3 },
        "images": [],
        "uri": format!("spotify:playlist:{id}")
    })
}

// Responds with three pages of two, two and one playlists, keyed on `offset`
fn paged_playlists(base: String) -> impl Fn(&Request) -> ResponseTemplate {
    move |req: &Request| {
        let offset = req
            .url
            .query_pairs()
            .find(|(k, _)| k == "offset")
            .map(|(_, v)| v.parse::<u64>().unwrap())
            .unwrap_or(0);

        let (ids, next): (Vec<&str>, Value) = match offset {
            0 => (
                vec!["p1", "p2"],
                json!(format!("{base}/v1/me/playlists?offset=2&limit=2")),
            ),
            2 => (
                vec!["p3", "p4"],
                json!(format!("{base}/v1/me/playlists?offset=4&limit=2")),
            ),
            _ => (vec!["p5"], Value::Null),
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "href": req.url.to_string(),
            "items": ids.into_iter().map(playlist_json).collect::<Vec<_>>(),
            "next": next,
            "previous": null,
            "total": 5,
            "limit": 2,
            "offset": offset
        }))
    }
}

#[tokio::test]
async fn test_collects_all_pages_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(paged_playlists(server.uri()))
        .expect(3)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let playlists = h.client.get_users_playlists().await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3", "p4", "p5"]);

    // Strictly sequential, following the cursors
    let offsets: Vec<Option<String>> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(
        offsets,
        vec![None, Some("2".to_string()), Some("4".to_string())]
    );
}

#[tokio::test]
async fn test_reduce_with_custom_fold() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(paged_playlists(server.uri()))
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let (pages, items) = h
        .client
        .reduce_all_pages(
            RequestDescriptor::get(h.client.endpoint("/me/playlists")),
            |(pages, items): (usize, usize), page: ApiListPage<Playlist>| {
                (pages + 1, items + page.items.len())
            },
            (0, 0),
        )
        .await
        .unwrap();

    assert_eq!(pages, 3);
    assert_eq!(items, 5);
}

#[tokio::test]
async fn test_single_page_with_empty_next() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [playlist_json("only")],
            "next": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let playlists = h.client.get_users_playlists().await.unwrap();

    assert_eq!(playlists.len(), 1);
}

#[tokio::test]
async fn test_refresh_applies_to_later_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(move |req: &Request| {
            let stale = req
                .headers
                .get("authorization")
                .is_some_and(|v| v.as_bytes() == b"Bearer stale");
            let second_page = req.url.query().is_some();

            if second_page && stale {
                return ResponseTemplate::new(401);
            }
            let body = if second_page {
                json!({ "items": [playlist_json("p2")], "next": null })
            } else {
                json!({
                    "items": [playlist_json("p1")],
                    "next": format!("{uri}/v1/me/playlists?offset=1")
                })
            };
            ResponseTemplate::new(200).set_body_json(body)
        })
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = logged_in(&server, "stale", "R").await;
    let playlists = h.client.get_users_playlists().await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
}

#[tokio::test]
async fn test_failing_page_aborts_walk() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(header("authorization", "Bearer A"))
        .respond_with(move |req: &Request| {
            if req.url.query().is_some() {
                ResponseTemplate::new(500).set_body_string("down")
            } else {
                ResponseTemplate::new(200).set_body_json(json!({
                    "items": [playlist_json("p1")],
                    "next": format!("{uri}/v1/me/playlists?offset=1")
                }))
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let h = logged_in(&server, "A", "B").await;
    let err = h.client.get_users_playlists().await.unwrap_err();

    assert!(matches!(err, SpotifyError::Http { status: 500, .. }));
}
