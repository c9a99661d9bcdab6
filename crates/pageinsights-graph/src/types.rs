//! Graph API response shapes for the login endpoints.

use pageinsights_core::{Page, Profile};
use serde::Deserialize;

/// `me/accounts`: `{ "data": [ { "id", "name", "access_token", ... } ] }`.
#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    pub data: Vec<Page>,
}

/// `me?fields=name,picture,link`.
#[derive(Debug, Deserialize)]
pub struct MeResponse {
    pub name: String,
    #[serde(default)]
    pub picture: Option<PictureEnvelope>,
    /// Only returned when the app has the `user_link` permission.
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PictureEnvelope {
    pub data: PictureData,
}

#[derive(Debug, Deserialize)]
pub struct PictureData {
    pub url: String,
}

impl From<MeResponse> for Profile {
    fn from(me: MeResponse) -> Self {
        Profile {
            name: me.name,
            picture_url: me.picture.map(|p| p.data.url).unwrap_or_default(),
            profile_link: me.link.unwrap_or_default(),
        }
    }
}
