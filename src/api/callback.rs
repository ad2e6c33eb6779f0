use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    spotify::{Navigation, SpotifyAuth},
    warning,
};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(auth): Extension<Arc<SpotifyAuth>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization was not granted: {}", error);
        auth.navigator().navigate(Navigation::ErrorPage);
        return Html("<h4>Login failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    if let Err(e) = auth.verify_state(params.get("state").map(String::as_str)) {
        warning!("Rejected callback: {}", e);
        return Html("<h4>Login failed.</h4>");
    }

    match auth.complete_login(code).await {
        Ok(()) => Html("<h2>Authentication successful.</h2><p>Close browser window.</p>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
