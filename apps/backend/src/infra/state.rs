use std::sync::Arc;

use crate::adapters::{LinkRepoSea, UserRepoSea};
use crate::auth::password::Argon2PasswordHasher;
use crate::cache::{FailOpenCache, ProfileCache, RedisCacheStore};
use crate::config::cache::redis_url;
use crate::config::db::{DbOwner, DbProfile};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::mail::{Mailer, TracingMailer};
use crate::services::{AuthService, LinkService, ProfileService};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for creating AppState instances (used in both tests and main).
///
/// The builder wires the production seams: SeaORM repositories over the
/// connected database and a fail-open Redis cache. Service-level tests
/// that want fakes construct the services directly instead.
pub struct StateBuilder {
    security_config: SecurityConfig,
    db_profile: DbProfile,
    redis_url: Option<String>,
    mailer: Arc<dyn Mailer>,
}

impl StateBuilder {
    pub fn new(db_profile: DbProfile) -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db_profile,
            redis_url: None,
            mailer: Arc::new(TracingMailer),
        }
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        // Single entrypoint: connect + migrate.
        let conn = bootstrap_db(self.db_profile, DbOwner::App).await?;

        let redis_url = self.redis_url.unwrap_or_else(redis_url);
        let store = RedisCacheStore::connect(&redis_url).await?;
        let cache = ProfileCache::new(Arc::new(FailOpenCache::new(Arc::new(store))));

        let users = Arc::new(UserRepoSea::new(conn.clone()));
        let links = Arc::new(LinkRepoSea::new(conn.clone()));
        let hasher = Arc::new(Argon2PasswordHasher::new());

        let auth = AuthService::new(
            users.clone(),
            hasher,
            cache.clone(),
            self.security_config.clone(),
            self.mailer,
        );
        let profiles = ProfileService::new(users.clone(), links.clone(), cache.clone());
        let link_service = LinkService::new(users, links, cache.clone());

        Ok(AppState::new(
            conn,
            self.security_config,
            cache,
            auth,
            profiles,
            link_service,
        ))
    }
}

pub fn build_state(db_profile: DbProfile) -> StateBuilder {
    StateBuilder::new(db_profile)
}
