use std::sync::Arc;

use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{Result, SpotifyError},
    management::{TokenKey, TokenStore},
    spotify::navigation::{Navigation, Navigator},
    types::TokenResponse,
    utils,
};

/// OAuth 2.0 Authorization Code flow with PKCE plus token refresh.
///
/// Holds the configuration, an HTTP client for the token endpoint and shared
/// handles to the [`TokenStore`] and the [`Navigator`]. The API client reuses
/// the same store and navigator through [`SpotifyAuth::store`] and
/// [`SpotifyAuth::navigator`].
pub struct SpotifyAuth {
    config: Config,
    http: Client,
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl SpotifyAuth {
    pub fn new(
        config: Config,
        store: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            config,
            http,
            store,
            navigator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Starts a login by sending the user to Spotify's authorization page.
    ///
    /// 1. **State**: generates a 32 character anti-CSRF state and stores it
    /// 2. **Verifier**: generates a 128 character code verifier and stores it
    /// 3. **Challenge**: derives `base64url(SHA-256(verifier))` without padding
    /// 4. **Redirect**: builds the authorization URL and navigates to it
    ///
    /// Both handshake values are written to the session tier of the store
    /// before navigation happens, so the callback can always find them.
    ///
    /// # Returns
    ///
    /// The authorization URL, or `None` when the navigator reports that no
    /// navigation surface is available. In that case nothing is stored.
    pub async fn begin_login<S: AsRef<str>>(&self, scopes: &[S]) -> Result<Option<Url>> {
        if !self.navigator.is_available() {
            debug!("no navigation surface available, skipping login");
            return Ok(None);
        }

        let state = utils::generate_state();
        self.store.set(TokenKey::State, state.clone()).await?;

        let code_verifier = utils::generate_code_verifier();
        self.store
            .set(TokenKey::CodeVerifier, code_verifier.clone())
            .await?;

        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let url = self.authorization_url(scopes, &state, &code_challenge)?;

        info!("redirecting to spotify authorization");
        self.navigator
            .navigate(Navigation::Authorize(url.as_str().to_string()));

        Ok(Some(url))
    }

    /// Builds `{auth_url}/authorize` with the PKCE query parameters.
    pub fn authorization_url<S: AsRef<str>>(
        &self,
        scopes: &[S],
        state: &str,
        code_challenge: &str,
    ) -> Result<Url> {
        let scope = scopes
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        Url::parse_with_params(
            &self.config.authorize_url(),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge),
            ],
        )
        .map_err(|e| SpotifyError::InvalidUrl(e.to_string()))
    }

    /// Checks the `state` returned on the callback against the stored one.
    pub fn verify_state(&self, returned: Option<&str>) -> Result<()> {
        match (self.store.get(TokenKey::State), returned) {
            (Some(expected), Some(returned)) if expected == returned => Ok(()),
            _ => Err(SpotifyError::StateMismatch),
        }
    }

    /// Exchanges an authorization code for an access and refresh token.
    ///
    /// Completes the PKCE flow by posting the code together with the stored
    /// code verifier to the token endpoint.
    ///
    /// # Errors
    ///
    /// Every failure also navigates to the error page:
    /// - [`SpotifyError::MissingVerifier`] when no login is in flight. The
    ///   token endpoint is not contacted.
    /// - [`SpotifyError::TokenExchange`] when the endpoint answers with an
    ///   `error` field
    /// - [`SpotifyError::MissingTokens`] when either token is absent
    ///
    /// On success both tokens are stored and the handshake values cleared.
    pub async fn complete_login(&self, code: &str) -> Result<()> {
        let Some(code_verifier) = self.store.get(TokenKey::CodeVerifier) else {
            return Err(self.fail(SpotifyError::MissingVerifier));
        };

        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", code_verifier.as_str()),
            ])
            .await
            .map_err(|e| self.fail(e))?;

        if let Some(error) = response.error {
            return Err(self.fail(SpotifyError::TokenExchange {
                code: error,
                description: response.error_description.unwrap_or_default(),
            }));
        }

        let (Some(access_token), Some(refresh_token)) =
            (response.access_token, response.refresh_token)
        else {
            return Err(self.fail(SpotifyError::MissingTokens));
        };

        self.store
            .set_credentials(access_token, refresh_token)
            .await?;
        self.store.clear_handshake().await?;

        info!("authorization code exchanged for tokens");
        Ok(())
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// The access token is always replaced. The refresh token is only
    /// replaced when the response carries a new one, otherwise the stored
    /// one stays valid.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::MissingRefreshToken`] (and a navigation to the error
    ///   page) when nothing is stored
    /// - [`SpotifyError::RefreshFailed`] when the response has no access token
    pub async fn refresh(&self) -> Result<()> {
        let Some(refresh_token) = self.store.get(TokenKey::RefreshToken) else {
            return Err(self.fail(SpotifyError::MissingRefreshToken));
        };

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .await?;

        let Some(access_token) = response.access_token else {
            let reason = response
                .error_description
                .or(response.error)
                .unwrap_or_else(|| "no access token returned".to_string());
            return Err(SpotifyError::RefreshFailed { reason });
        };

        match response.refresh_token {
            Some(rotated) => self.store.set_credentials(access_token, rotated).await?,
            None => self.store.set(TokenKey::AccessToken, access_token).await?,
        }

        debug!("access token refreshed");
        Ok(())
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let res = self
            .http
            .post(self.config.token_url())
            .form(form)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => Ok(token),
            Err(_) if !status.is_success() => Err(SpotifyError::Http {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn fail(&self, err: SpotifyError) -> SpotifyError {
        self.navigator.navigate(Navigation::ErrorPage);
        err
    }
}
