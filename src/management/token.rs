use tokio::sync::{Mutex, watch};
use tracing::debug;

use super::backend::{MemoryBackend, StorageBackend};
use crate::error::StoreError;

/// Names of the values held by the [`TokenStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    AccessToken,
    RefreshToken,
    CodeVerifier,
    State,
}

/// How long a stored value is allowed to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives restarts (access and refresh token).
    LongLived,
    /// Bound to a single login attempt (verifier and anti-CSRF state).
    Session,
}

impl TokenKey {
    pub const ALL: [TokenKey; 4] = [
        TokenKey::AccessToken,
        TokenKey::RefreshToken,
        TokenKey::CodeVerifier,
        TokenKey::State,
    ];

    /// Name under which the value is persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::AccessToken => "accessToken",
            TokenKey::RefreshToken => "refreshToken",
            TokenKey::CodeVerifier => "codeVerifier",
            TokenKey::State => "state",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            TokenKey::AccessToken | TokenKey::RefreshToken => Tier::LongLived,
            TokenKey::CodeVerifier | TokenKey::State => Tier::Session,
        }
    }
}

/// Snapshot of everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub code_verifier: Option<String>,
    pub state: Option<String>,
}

impl TokenState {
    pub fn get(&self, key: TokenKey) -> Option<&String> {
        match key {
            TokenKey::AccessToken => self.access_token.as_ref(),
            TokenKey::RefreshToken => self.refresh_token.as_ref(),
            TokenKey::CodeVerifier => self.code_verifier.as_ref(),
            TokenKey::State => self.state.as_ref(),
        }
    }

    fn slot(&mut self, key: TokenKey) -> &mut Option<String> {
        match key {
            TokenKey::AccessToken => &mut self.access_token,
            TokenKey::RefreshToken => &mut self.refresh_token,
            TokenKey::CodeVerifier => &mut self.code_verifier,
            TokenKey::State => &mut self.state,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// Persisted token and login-handshake state.
///
/// The store is the only owner of [`TokenState`]. Every write is persisted to
/// the backend of the key's [`Tier`] before subscribers are notified, and
/// writes are serialized so a file backend never interleaves two
/// read-modify-write cycles. Keys of one tier written together reach their
/// backend as a single batch, and a failed write is never published.
pub struct TokenStore {
    long_lived: Box<dyn StorageBackend>,
    session: Box<dyn StorageBackend>,
    state: watch::Sender<TokenState>,
    writes: Mutex<()>,
}

impl TokenStore {
    /// Opens the store, loading whatever the backends already hold.
    pub async fn open(
        long_lived: impl StorageBackend + 'static,
        session: impl StorageBackend + 'static,
    ) -> Result<Self, StoreError> {
        let long_lived: Box<dyn StorageBackend> = Box::new(long_lived);
        let session: Box<dyn StorageBackend> = Box::new(session);

        let mut initial = TokenState::default();
        for key in TokenKey::ALL {
            let backend = match key.tier() {
                Tier::LongLived => &long_lived,
                Tier::Session => &session,
            };
            if let Some(raw) = backend.load(key.as_str()).await? {
                *initial.slot(key) = serde_json::from_str::<Option<String>>(&raw)?;
            }
        }

        let (state, _) = watch::channel(initial);
        Ok(Self {
            long_lived,
            session,
            state,
            writes: Mutex::new(()),
        })
    }

    /// An empty store backed by memory only.
    pub fn in_memory() -> Self {
        let (state, _) = watch::channel(TokenState::default());
        Self {
            long_lived: Box::new(MemoryBackend::new()),
            session: Box::new(MemoryBackend::new()),
            state,
            writes: Mutex::new(()),
        }
    }

    pub fn get(&self, key: TokenKey) -> Option<String> {
        self.state.borrow().get(key).cloned()
    }

    pub fn snapshot(&self) -> TokenState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed change.
    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.state.subscribe()
    }

    pub async fn set(&self, key: TokenKey, value: impl Into<String>) -> Result<(), StoreError> {
        self.write(&[(key, Some(value.into()))]).await
    }

    pub async fn clear(&self, key: TokenKey) -> Result<(), StoreError> {
        self.write(&[(key, None)]).await
    }

    /// Stores both tokens and publishes them in one notification.
    pub async fn set_credentials(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.write(&[
            (TokenKey::AccessToken, Some(access_token.into())),
            (TokenKey::RefreshToken, Some(refresh_token.into())),
        ])
        .await
    }

    pub async fn clear_credentials(&self) -> Result<(), StoreError> {
        self.write(&[(TokenKey::AccessToken, None), (TokenKey::RefreshToken, None)])
            .await
    }

    pub async fn clear_handshake(&self) -> Result<(), StoreError> {
        self.write(&[(TokenKey::CodeVerifier, None), (TokenKey::State, None)])
            .await
    }

    async fn write(&self, changes: &[(TokenKey, Option<String>)]) -> Result<(), StoreError> {
        let _guard = self.writes.lock().await;

        let mut serialized = Vec::with_capacity(changes.len());
        for (key, value) in changes {
            let raw = value.as_ref().map(serde_json::to_string).transpose()?;
            serialized.push((*key, raw));
        }

        // one batch per tier, so a pair of tokens is never half-persisted
        for tier in [Tier::LongLived, Tier::Session] {
            let batch: Vec<(&str, Option<&str>)> = serialized
                .iter()
                .filter(|(key, _)| key.tier() == tier)
                .map(|(key, raw)| (key.as_str(), raw.as_deref()))
                .collect();
            if batch.is_empty() {
                continue;
            }

            self.backend(tier).apply(&batch).await?;
            for (key, raw) in &batch {
                debug!(key = *key, set = raw.is_some(), "token store updated");
            }
        }

        self.state.send_modify(|state| {
            for (key, value) in changes {
                *state.slot(*key) = value.clone();
            }
        });
        Ok(())
    }

    fn backend(&self, tier: Tier) -> &dyn StorageBackend {
        match tier {
            Tier::LongLived => self.long_lived.as_ref(),
            Tier::Session => self.session.as_ref(),
        }
    }
}
