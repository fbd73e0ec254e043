//! Link management.
//!
//! Every write checks ownership first and invalidates the link list plus
//! the public profile view afterwards. The platform registry itself is
//! read through the cache with a long TTL.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::domain::platforms::{default_platform_rules, validate_link_url, PlatformRules};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::errors::ErrorCode;
use crate::repos::links::{Link, LinkChanges, LinkRepo, NewLink};
use crate::repos::users::{User, UserRepo};

const TITLE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkInput {
    pub platform: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkInput {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone)]
pub struct LinkService {
    users: Arc<dyn UserRepo>,
    links: Arc<dyn LinkRepo>,
    cache: ProfileCache,
}

impl LinkService {
    pub fn new(users: Arc<dyn UserRepo>, links: Arc<dyn LinkRepo>, cache: ProfileCache) -> Self {
        Self {
            users,
            links,
            cache,
        }
    }

    /// The owner's full link list (active and inactive), cache-aside.
    pub async fn list_links(&self, user_id: Uuid) -> Result<Vec<Link>, AppError> {
        if let Some(links) = self.cache.get_user_links(user_id).await {
            return Ok(links);
        }

        let links = self.links.list_by_user(user_id).await?;
        self.cache.put_user_links(user_id, &links).await;
        Ok(links)
    }

    /// Create a link at the end of the user's list.
    pub async fn create_link(
        &self,
        user_id: Uuid,
        input: CreateLinkInput,
    ) -> Result<Link, AppError> {
        let rules = self.platform_rules().await;
        validate_link_url(&rules, &input.platform, &input.url)?;
        validate_title(&input.title)?;

        let owner = self.require_user(user_id).await?;
        let display_order = self.links.list_by_user(user_id).await?.len() as i32;

        let link = self
            .links
            .create(NewLink {
                user_id,
                platform: input.platform,
                url: input.url,
                title: input.title.trim().to_string(),
                display_order,
            })
            .await?;

        self.cache
            .invalidate_links(user_id, &owner.username)
            .await;
        Ok(link)
    }

    pub async fn update_link(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        input: UpdateLinkInput,
    ) -> Result<Link, AppError> {
        let existing = self.require_owned_link(user_id, link_id).await?;

        // Platform and URL are validated as the pair they will become, so
        // changing one cannot sneak past the other's rule.
        let platform = input.platform.as_deref().unwrap_or(&existing.platform);
        let url = input.url.as_deref().unwrap_or(&existing.url);
        let rules = self.platform_rules().await;
        validate_link_url(&rules, platform, url)?;
        if let Some(title) = &input.title {
            validate_title(title)?;
        }

        let updated = self
            .links
            .update(
                link_id,
                LinkChanges {
                    platform: input.platform,
                    url: input.url,
                    title: input.title.map(|t| t.trim().to_string()),
                },
            )
            .await?;

        self.invalidate_for(user_id).await?;
        Ok(updated)
    }

    /// Flip a link between shown and hidden without losing its data.
    pub async fn toggle_link(&self, user_id: Uuid, link_id: Uuid) -> Result<Link, AppError> {
        let existing = self.require_owned_link(user_id, link_id).await?;
        let updated = self.links.set_active(link_id, !existing.is_active).await?;
        self.invalidate_for(user_id).await?;
        Ok(updated)
    }

    pub async fn delete_link(&self, user_id: Uuid, link_id: Uuid) -> Result<(), AppError> {
        self.require_owned_link(user_id, link_id).await?;
        self.links.delete(link_id).await?;
        self.invalidate_for(user_id).await?;
        Ok(())
    }

    /// Replace the display order with the given permutation. The id list
    /// must contain exactly the user's links, each once.
    pub async fn reorder_links(
        &self,
        user_id: Uuid,
        ordered_ids: Vec<Uuid>,
    ) -> Result<Vec<Link>, AppError> {
        let current = self.links.list_by_user(user_id).await?;

        let mut expected: Vec<Uuid> = current.iter().map(|link| link.id).collect();
        let mut given = ordered_ids.clone();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            return Err(AppError::validation(
                ErrorCode::ValidationError,
                "Reorder must list each of your links exactly once",
            ));
        }

        self.links.reorder(user_id, &ordered_ids).await?;
        self.invalidate_for(user_id).await?;
        self.links.list_by_user(user_id).await.map_err(Into::into)
    }

    /// Platform registry, cache-aside against the built-in defaults.
    async fn platform_rules(&self) -> PlatformRules {
        if let Some(rules) = self.cache.get_platform_rules().await {
            return rules;
        }
        let rules = default_platform_rules();
        self.cache.put_platform_rules(&rules).await;
        rules
    }

    async fn require_owned_link(&self, user_id: Uuid, link_id: Uuid) -> Result<Link, AppError> {
        let link = self
            .links
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Link, "No such link"))?;
        if link.user_id != user_id {
            return Err(AppError::forbidden(
                ErrorCode::NotLinkOwner,
                "You do not own this link",
            ));
        }
        Ok(link)
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, AppError> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?)
    }

    async fn invalidate_for(&self, user_id: Uuid) -> Result<(), AppError> {
        let owner = self.require_user(user_id).await?;
        self.cache
            .invalidate_links(user_id, &owner.username)
            .await;
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.len() > TITLE_MAX_LEN {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            format!("Title must be 1-{TITLE_MAX_LEN} characters"),
        ));
    }
    Ok(())
}
