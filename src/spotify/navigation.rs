use crate::warning;

/// Places the client may send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Spotify's authorization page for a fresh login.
    Authorize(String),
    /// Ask the user to log in again after access was revoked.
    LoginPage,
    /// Report a failed or corrupted login handshake.
    ErrorPage,
}

/// Side effect invoked whenever the flow has to move the user elsewhere.
pub trait Navigator: Send + Sync {
    /// Whether there is any surface to navigate on at all.
    fn is_available(&self) -> bool {
        true
    }

    fn navigate(&self, target: Navigation);
}

/// Opens the default browser, falling back to printing instructions.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, target: Navigation) {
        match target {
            Navigation::Authorize(url) => {
                if webbrowser::open(&url).is_err() {
                    warning!(
                        "Failed to open browser. Please navigate to the following URL manually:\n{}",
                        url
                    )
                }
            }
            Navigation::LoginPage => {
                warning!("Spotify access was revoked. Please run sporlist auth to log in again.")
            }
            Navigation::ErrorPage => {
                warning!("Spotify login failed. Please run sporlist auth to start over.")
            }
        }
    }
}
