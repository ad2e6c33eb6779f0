use std::{sync::Arc, time::Duration};

use reqwest::{
    Client, Method, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, warn};

use crate::{
    config::RetryPolicy,
    error::{Result, SpotifyError},
    management::{TokenKey, TokenStore},
    spotify::{
        auth::SpotifyAuth,
        navigation::{Navigation, Navigator},
    },
};

/// A request that can be sent any number of times.
///
/// The body is kept as owned bytes and every attempt builds a fresh
/// `reqwest::Request` from it. The bearer token is not part of the
/// descriptor, it is attached at send time from the token store.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Same request against another URL, used to follow `next` cursors.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }
}

/// Authenticated Spotify Web API client.
///
/// Every call goes through [`SpotifyClient::execute`], which applies the
/// response policy:
///
/// | Status | Action |
/// |---|---|
/// | 401 | refresh the token, resend, re-evaluate (bounded) |
/// | 403 | clear credentials, navigate to login, fail with `AccessRevoked` |
/// | 429 | wait `Retry-After` (or the default delay), resend, re-evaluate |
/// | other >= 400 | fail with `Http { status, body }` |
/// | anything else | return the response |
pub struct SpotifyClient {
    http: Client,
    auth: Arc<SpotifyAuth>,
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    api_url: String,
    retry: RetryPolicy,
    refresh_guard: Mutex<()>,
}

impl SpotifyClient {
    pub fn new(auth: Arc<SpotifyAuth>) -> Result<Self> {
        let config = auth.config();
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            store: Arc::clone(auth.store()),
            navigator: Arc::clone(auth.navigator()),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
            auth,
            refresh_guard: Mutex::new(()),
        })
    }

    pub fn auth(&self) -> &Arc<SpotifyAuth> {
        &self.auth
    }

    /// Absolute URL for an API path such as `/me/playlists`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends `descriptor` and applies the retry policy until the response is
    /// final.
    ///
    /// 429 responses are always followed by a resend that runs through the
    /// whole policy again, whether or not the server sent `Retry-After`.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::AuthLoop`] once `max_auth_retries` refreshes did not
    ///   help
    /// - [`SpotifyError::AccessRevoked`] on 403
    /// - [`SpotifyError::RateLimited`] when `Retry-After` exceeds
    ///   `max_retry_after`
    /// - [`SpotifyError::Http`] for every other error status
    /// - refresh errors such as [`SpotifyError::MissingRefreshToken`]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let mut auth_retries = 0;

        loop {
            let sent_with = self.store.get(TokenKey::AccessToken);
            let response = self.send(descriptor, sent_with.as_deref()).await?;
            let status = response.status();

            match status {
                StatusCode::UNAUTHORIZED => {
                    if auth_retries >= self.retry.max_auth_retries {
                        warn!(url = %descriptor.url, attempts = auth_retries, "still unauthorized after refreshing");
                        return Err(SpotifyError::AuthLoop {
                            attempts: auth_retries,
                        });
                    }
                    auth_retries += 1;
                    debug!(url = %descriptor.url, attempt = auth_retries, "access token rejected, refreshing");
                    self.refresh_after_rejection(sent_with.as_deref()).await?;
                }
                StatusCode::FORBIDDEN => {
                    debug!(url = %descriptor.url, "access forbidden, clearing credentials");
                    self.store.clear_credentials().await?;
                    self.navigator.navigate(Navigation::LoginPage);
                    return Err(SpotifyError::AccessRevoked);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let delay = self.rate_limit_delay(response.headers())?;
                    debug!(url = %descriptor.url, delay_ms = delay.as_millis() as u64, "rate limited, waiting");
                    sleep(delay).await;
                }
                s if s.is_client_error() || s.is_server_error() => {
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(
                                url = %descriptor.url,
                                error = %e,
                                "cannot read error response body"
                            );
                            String::new()
                        }
                    };
                    return Err(SpotifyError::Http {
                        status: s.as_u16(),
                        body,
                    });
                }
                _ => return Ok(response),
            }
        }
    }

    /// [`execute`](Self::execute) and decode the JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T> {
        let response = self.execute(descriptor).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, descriptor: &RequestDescriptor, token: Option<&str>) -> Result<Response> {
        let mut request = self
            .http
            .request(descriptor.method.clone(), &descriptor.url)
            .headers(descriptor.headers.clone());

        if !descriptor.headers.contains_key(CONTENT_TYPE) {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &descriptor.body {
            request = request.body(body.clone());
        }

        debug!(method = %descriptor.method, url = %descriptor.url, "sending request");
        Ok(request.send().await?)
    }

    /// Refreshes once per rejected token: if another caller already replaced
    /// the token this request was sent with, the new one is simply reused.
    async fn refresh_after_rejection(&self, sent_with: Option<&str>) -> Result<()> {
        let _guard = self.refresh_guard.lock().await;

        let current = self.store.get(TokenKey::AccessToken);
        if current.is_some() && current.as_deref() != sent_with {
            debug!("access token already refreshed by another request");
            return Ok(());
        }

        self.auth.refresh().await
    }

    fn rate_limit_delay(&self, headers: &HeaderMap) -> Result<Duration> {
        match retry_after(headers) {
            Some(secs) if secs > self.retry.max_retry_after => {
                Err(SpotifyError::RateLimited { retry_after: secs })
            }
            Some(secs) => Ok(self
                .retry
                .retry_after_unit
                .saturating_mul(u32::try_from(secs).unwrap_or(u32::MAX))),
            None => Ok(self.retry.default_rate_limit_delay),
        }
    }
}

/// `Retry-After` as whole seconds. HTTP dates and garbage yield `None`.
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
