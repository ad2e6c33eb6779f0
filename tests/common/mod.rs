#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use sporlist::{
    config::Config,
    management::{TokenKey, TokenState, TokenStore},
    spotify::{Navigation, Navigator, SpotifyAuth, SpotifyClient},
};
use tokio::sync::watch;
use wiremock::MockServer;

pub const CLIENT_ID: &str = "test-client";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

/// Navigator that remembers every visit together with the token state seen
/// at that moment.
pub struct RecordingNavigator {
    available: bool,
    observed: Option<watch::Receiver<TokenState>>,
    visits: Mutex<Vec<(Navigation, Option<TokenState>)>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: true,
            observed: None,
            visits: Mutex::new(Vec::new()),
        })
    }

    pub fn observing(store: &TokenStore) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            observed: Some(store.subscribe()),
            visits: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            available: false,
            observed: None,
            visits: Mutex::new(Vec::new()),
        })
    }

    pub fn visits(&self) -> Vec<Navigation> {
        self.visits
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }

    pub fn state_at_visit(&self, index: usize) -> Option<TokenState> {
        self.visits.lock().unwrap()[index].1.clone()
    }
}

impl Navigator for RecordingNavigator {
    fn is_available(&self) -> bool {
        self.available
    }

    fn navigate(&self, target: Navigation) {
        let seen = self.observed.as_ref().map(|rx| rx.borrow().clone());
        self.visits.lock().unwrap().push((target, seen));
    }
}

/// Configuration pointing both hosts at the mock server, with millisecond
/// rate-limit delays.
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::new(CLIENT_ID);
    config.auth_url = server.uri();
    config.api_url = format!("{}/v1", server.uri());
    config.redirect_uri = REDIRECT_URI.to_string();
    config.request_timeout = Duration::from_secs(5);
    config.retry.default_rate_limit_delay = Duration::from_millis(10);
    config.retry.retry_after_unit = Duration::from_millis(10);
    config
}

pub struct Harness {
    pub store: Arc<TokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub auth: Arc<SpotifyAuth>,
    pub client: SpotifyClient,
}

pub fn harness_with(
    config: Config,
    store: Arc<TokenStore>,
    navigator: Arc<RecordingNavigator>,
) -> Harness {
    let auth = Arc::new(
        SpotifyAuth::new(
            config,
            Arc::clone(&store),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )
        .expect("auth"),
    );
    let client = SpotifyClient::new(Arc::clone(&auth)).expect("client");

    Harness {
        store,
        navigator,
        auth,
        client,
    }
}

pub fn harness_with_config(config: Config) -> Harness {
    let store = Arc::new(TokenStore::in_memory());
    let navigator = RecordingNavigator::observing(&store);
    harness_with(config, store, navigator)
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with_config(test_config(server))
}

/// Harness whose store already holds `access` / `refresh`.
pub async fn logged_in(server: &MockServer, access: &str, refresh: &str) -> Harness {
    let h = harness(server);
    h.store
        .set_credentials(access, refresh)
        .await
        .expect("credentials");
    h
}

pub fn access_token(h: &Harness) -> Option<String> {
    h.store.get(TokenKey::AccessToken)
}

pub fn refresh_token(h: &Harness) -> Option<String> {
    h.store.get(TokenKey::RefreshToken)
}
