//! Link repository contract and domain models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::domain::DomainError;

/// Link domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: String,
    pub url: String,
    pub title: String,
    pub display_order: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields required to persist a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: Uuid,
    pub platform: String,
    pub url: String,
    pub title: String,
    pub display_order: i32,
}

/// Partial link update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct LinkChanges {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Persistence contract for links.
#[async_trait]
pub trait LinkRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, DomainError>;

    /// All of a user's links, ordered by display_order.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError>;

    /// Only active links, ordered by display_order (public profile view).
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError>;

    async fn create(&self, new_link: NewLink) -> Result<Link, DomainError>;

    async fn update(&self, id: Uuid, changes: LinkChanges) -> Result<Link, DomainError>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Link, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Rewrite display_order for the given links in one atomic operation.
    /// The slice carries the new order, first entry becoming order 0.
    async fn reorder(&self, user_id: Uuid, ordered_ids: &[Uuid]) -> Result<(), DomainError>;
}
