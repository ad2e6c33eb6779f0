mod common;

use std::{collections::HashMap, sync::Arc};

use serde_json::{Value, json};
use sporlist::{management::TokenKey, server, spotify::Navigation};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::*;

// Starts the callback server on a free port and returns its base URL
async fn spawn_callback_server(h: &Harness) -> String {
    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let auth = Arc::clone(&h.auth);
    tokio::spawn(async move {
        let _ = server::start_api_server(listener, auth).await;
    });
    format!("http://{addr}")
}

async fn mount_token_exchange(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "B"
        })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let mock = MockServer::start().await;
    let h = harness(&mock);
    let base = spawn_callback_server(&h).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "sporlist");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_callback_completes_login() {
    let mock = MockServer::start().await;
    mount_token_exchange(&mock, 1).await;
    let h = harness(&mock);
    let base = spawn_callback_server(&h).await;

    let url = h.auth.begin_login(&["a"]).await.unwrap().unwrap();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

    let mut rx = h.store.subscribe();
    let page = reqwest::get(format!(
        "{base}/callback?code=the-code&state={}",
        query["state"]
    ))
    .await
    .unwrap()
    .text()
    .await
    .unwrap();

    assert!(page.contains("Authentication successful"));
    rx.wait_for(|state| state.is_authenticated() && state.code_verifier.is_none())
        .await
        .unwrap();
    assert_eq!(h.store.get(TokenKey::AccessToken).as_deref(), Some("A"));
    assert_eq!(h.store.get(TokenKey::State), None);
}

#[tokio::test]
async fn test_callback_rejects_foreign_state() {
    let mock = MockServer::start().await;
    mount_token_exchange(&mock, 0).await;
    let h = harness(&mock);
    let base = spawn_callback_server(&h).await;

    h.auth.begin_login(&["a"]).await.unwrap();

    let page = reqwest::get(format!("{base}/callback?code=the-code&state=forged"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("Login failed"));
    assert!(!h.store.snapshot().is_authenticated());
    // The pending handshake is untouched
    assert!(h.store.get(TokenKey::CodeVerifier).is_some());
}

#[tokio::test]
async fn test_callback_reports_denied_authorization() {
    let mock = MockServer::start().await;
    mount_token_exchange(&mock, 0).await;
    let h = harness(&mock);
    let base = spawn_callback_server(&h).await;

    let page = reqwest::get(format!("{base}/callback?error=access_denied&state=x"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("Login failed"));
    assert_eq!(h.navigator.visits(), vec![Navigation::ErrorPage]);
}

#[tokio::test]
async fn test_callback_without_code() {
    let mock = MockServer::start().await;
    let h = harness(&mock);
    let base = spawn_callback_server(&h).await;

    let page = reqwest::get(format!("{base}/callback"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("Missing authorization code"));
}
