use crate::{
    error::Result,
    spotify::client::{RequestDescriptor, SpotifyClient},
    types::User,
};

impl SpotifyClient {
    /// Profile of the user the stored token belongs to.
    pub async fn get_current_user(&self) -> Result<User> {
        self.execute_json(&RequestDescriptor::get(self.endpoint("/me")))
            .await
    }
}
