use std::{sync::Arc, time::Duration};

use crate::{error, info, server, success, warning};

use super::connect_or_exit;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn auth() {
    let client = connect_or_exit().await;
    let auth = Arc::clone(client.auth());
    let server_addr = auth.config().server_addr.clone();

    let listener = match server::bind(&server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot start callback server on {}. Err: {}", server_addr, e),
    };

    let server_auth = Arc::clone(&auth);
    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(listener, server_auth).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    // subscribe before the handshake starts so no update is missed
    let mut updates = auth.store().subscribe();

    match auth.begin_login(&auth.config().scopes).await {
        Ok(Some(_)) => info!("Waiting for Spotify authorization..."),
        Ok(None) => error!("No browser available to authorize sporlist."),
        Err(e) => error!("Cannot start login. Err: {}", e),
    }

    let finished = tokio::time::timeout(
        LOGIN_TIMEOUT,
        updates.wait_for(|state| state.is_authenticated() && state.code_verifier.is_none()),
    )
    .await
    .is_ok_and(|state| state.is_ok());

    if !finished {
        error!("Authentication failed or timed out.");
    }
    success!("Authentication successful!");
}

pub async fn logout() {
    let client = connect_or_exit().await;
    let store = client.auth().store();

    if let Err(e) = store.clear_credentials().await {
        error!("Cannot remove stored tokens. Err: {}", e);
    }
    success!("Logged out.");
}

pub async fn me() {
    let client = connect_or_exit().await;

    match client.get_current_user().await {
        Ok(user) => {
            info!("Id: {}", user.id);
            info!("Name: {}", user.display_name.unwrap_or_default());
            if let Some(country) = user.country {
                info!("Country: {}", country);
            }
            if let Some(product) = user.product {
                info!("Plan: {}", product);
            }
        }
        Err(e) => error!("Cannot load profile. Err: {}", e),
    }
}
