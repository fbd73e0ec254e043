//! SeaORM adapter for the user repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::users;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::infra::db_errors::map_db_err;
use crate::repos::users::{NewUser, ProfileChanges, User, UserRepo};

/// SeaORM implementation of `UserRepo`, holding a cloned connection handle
/// to the shared pool.
#[derive(Debug, Clone)]
pub struct UserRepoSea {
    db: DatabaseConnection,
}

impl UserRepoSea {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require_model(&self, id: Uuid) -> Result<users::Model, DomainError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, format!("User {id} not found")))
    }
}

#[async_trait]
impl UserRepo for UserRepoSea {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let now = OffsetDateTime::now_utc();
        let active = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            username: Set(new_user.username),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            bio: Set(None),
            avatar_url: Set(None),
            is_active: Set(true),
            email_verified: Set(false),
            password_hash: Set(new_user.password_hash),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn set_avatar_url(
        &self,
        id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<User, DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();
        active.avatar_url = Set(avatar_url);
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<User, DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();
        active.email_verified = Set(true);
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
        let model = self.require_model(id).await?;
        let mut active = model.into_active_model();
        active.last_login_at = Set(Some(OffsetDateTime::now_utc()));

        active.update(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        // Links are removed by the FK cascade.
        users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            avatar_url: model.avatar_url,
            is_active: model.is_active,
            email_verified: model.email_verified,
            password_hash: model.password_hash,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
