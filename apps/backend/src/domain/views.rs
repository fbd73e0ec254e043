//! Read-model views assembled from users and links.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::repos::links::Link;
use crate::repos::users::User;

/// A single link as shown on the public profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLink {
    pub platform: String,
    pub url: String,
    pub title: String,
}

impl From<Link> for PublicLink {
    fn from(link: Link) -> Self {
        Self {
            platform: link.platform,
            url: link.url,
            title: link.title,
        }
    }
}

/// The public profile page view: profile fields plus active links in
/// display order. This is the highest-traffic read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub links: Vec<PublicLink>,
}

impl PublicProfile {
    pub fn assemble(user: &User, links: Vec<Link>) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            links: links.into_iter().map(PublicLink::from).collect(),
        }
    }
}

/// Session projection written on successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
}
