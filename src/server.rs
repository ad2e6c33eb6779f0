use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;

use crate::{Res, api, spotify::SpotifyAuth};

/// Routes of the local callback server.
pub fn router(auth: Arc<SpotifyAuth>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(auth)))
}

/// Binds the callback listener so a busy port is reported before the login
/// starts.
pub async fn bind(server_addr: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(server_addr)?;
    Ok(TcpListener::bind(&addr).await?)
}

pub async fn start_api_server(listener: TcpListener, auth: Arc<SpotifyAuth>) -> Res<()> {
    axum::serve(listener, router(auth)).await?;
    Ok(())
}
