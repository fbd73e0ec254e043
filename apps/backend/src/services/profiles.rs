//! Profile reads and writes.
//!
//! Reads are cache-aside: cache first, then persistence, then populate.
//! Writes go to persistence first and invalidate afterwards; the next read
//! repopulates. Nothing here writes fresh values into the cache on the
//! write path.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::domain::views::PublicProfile;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::errors::ErrorCode;
use crate::repos::links::LinkRepo;
use crate::repos::users::{ProfileChanges, User, UserProfile, UserRepo};
use crate::services::auth::validate_username;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepo>,
    links: Arc<dyn LinkRepo>,
    cache: ProfileCache,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepo>, links: Arc<dyn LinkRepo>, cache: ProfileCache) -> Self {
        Self {
            users,
            links,
            cache,
        }
    }

    /// Owner-facing profile, cache-aside.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        if let Some(profile) = self.cache.get_user_profile(user_id).await {
            return Ok(profile);
        }

        let user = self.require_user(user_id).await?;
        let profile = UserProfile::from(user);
        self.cache.put_user_profile(&profile).await;
        Ok(profile)
    }

    /// Public profile page by username, cache-aside. Inactive accounts are
    /// indistinguishable from missing ones.
    pub async fn get_public_profile(&self, username: &str) -> Result<PublicProfile, AppError> {
        let username = username.trim().to_lowercase();

        if let Some(view) = self.cache.get_public_profile(&username).await {
            return Ok(view);
        }

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::User, format!("No profile for '{username}'"))
            })?;
        let links = self.links.list_active_by_user(user.id).await?;

        let view = PublicProfile::assemble(&user, links);
        self.cache.put_public_profile(&username, &view).await;
        Ok(view)
    }

    /// Apply a partial profile update, then invalidate the stale views.
    /// A username change additionally drops the public entry keyed by the
    /// old username.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, AppError> {
        let new_username = match input.username {
            Some(raw) => {
                validate_username(&raw)?;
                Some(raw.trim().to_lowercase())
            }
            None => None,
        };

        let before = self.require_user(user_id).await?;
        let updated = self
            .users
            .update_profile(
                user_id,
                ProfileChanges {
                    username: new_username.clone(),
                    first_name: input.first_name,
                    last_name: input.last_name,
                    bio: input.bio,
                },
            )
            .await?;

        match new_username {
            Some(new) if new != before.username => {
                self.cache
                    .invalidate_username_change(user_id, &before.username, &new)
                    .await;
            }
            _ => {
                self.cache
                    .invalidate_profile(user_id, &before.username)
                    .await;
            }
        }

        Ok(UserProfile::from(updated))
    }

    pub async fn update_avatar(
        &self,
        user_id: Uuid,
        avatar_url: String,
    ) -> Result<UserProfile, AppError> {
        if !avatar_url.starts_with("http://") && !avatar_url.starts_with("https://") {
            return Err(AppError::validation(
                ErrorCode::InvalidUrl,
                "Avatar URL must be http(s)",
            ));
        }
        self.set_avatar(user_id, Some(avatar_url)).await
    }

    pub async fn delete_avatar(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.set_avatar(user_id, None).await
    }

    /// Delete the account and every cache entry derived from it. Links go
    /// with the user via the foreign key.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        let user = self.require_user(user_id).await?;
        self.users.delete(user_id).await?;
        self.cache
            .invalidate_user_deletion(user_id, &user.username)
            .await;
        tracing::info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    async fn set_avatar(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<UserProfile, AppError> {
        let updated = self.users.set_avatar_url(user_id, avatar_url).await?;
        self.cache
            .invalidate_profile(user_id, &updated.username)
            .await;
        Ok(UserProfile::from(updated))
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, AppError> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?)
    }
}
