//! SeaORM adapter for the link repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::links;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::infra::db_errors::map_db_err;
use crate::repos::links::{Link, LinkChanges, LinkRepo, NewLink};

/// SeaORM implementation of `LinkRepo`.
#[derive(Debug, Clone)]
pub struct LinkRepoSea {
    db: DatabaseConnection,
}

impl LinkRepoSea {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require_model(&self, id: Uuid) -> Result<links::Model, DomainError> {
        links::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Link, format!("Link {id} not found")))
    }
}

#[async_trait]
impl LinkRepo for LinkRepoSea {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, DomainError> {
        let model = links::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(Link::from))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError> {
        let models = links::Entity::find()
            .filter(links::Column::UserId.eq(user_id))
            .order_by_asc(links::Column::DisplayOrder)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(Link::from).collect())
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError> {
        let models = links::Entity::find()
            .filter(links::Column::UserId.eq(user_id))
            .filter(links::Column::IsActive.eq(true))
            .order_by_asc(links::Column::DisplayOrder)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(Link::from).collect())
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, DomainError> {
        let now = OffsetDateTime::now_utc();
        let active = links::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_link.user_id),
            platform: Set(new_link.platform),
            url: Set(new_link.url),
            title: Set(new_link.title),
            display_order: Set(new_link.display_order),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(Link::from(model))
    }

    async fn update(&self, id: Uuid, changes: LinkChanges) -> Result<Link, DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();

        if let Some(platform) = changes.platform {
            active.platform = Set(platform);
        }
        if let Some(url) = changes.url {
            active.url = Set(url);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(Link::from(model))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Link, DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(Link::from(model))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        links::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn reorder(&self, user_id: Uuid, ordered_ids: &[Uuid]) -> Result<(), DomainError> {
        // The batch runs in a single transaction so a half-applied reorder
        // can never become visible.
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now = OffsetDateTime::now_utc();

        for (position, link_id) in ordered_ids.iter().enumerate() {
            let model = links::Entity::find_by_id(*link_id)
                .filter(links::Column::UserId.eq(user_id))
                .one(&txn)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| {
                    DomainError::not_found(
                        NotFoundKind::Link,
                        format!("Link {link_id} not found for user"),
                    )
                })?;

            let mut active = model.into_active_model();
            active.display_order = Set(position as i32);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

impl From<links::Model> for Link {
    fn from(model: links::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            platform: model.platform,
            url: model.url,
            title: model.title,
            display_order: model.display_order,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
