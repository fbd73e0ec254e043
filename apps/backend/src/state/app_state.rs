use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::cache::ProfileCache;
use crate::services::{AuthService, LinkService, ProfileService};

/// Application state containing shared resources. Handlers reach the
/// business logic only through the services carried here.
#[derive(Clone)]
pub struct AppState {
    /// Database connection (absent in service-level test setups)
    db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub cache: ProfileCache,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub links: LinkService,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        security: SecurityConfig,
        cache: ProfileCache,
        auth: AuthService,
        profiles: ProfileService,
        links: LinkService,
    ) -> Self {
        Self {
            db: Some(db),
            security,
            cache,
            auth,
            profiles,
            links,
        }
    }

    /// State without a database connection, for setups where the services
    /// were built on in-memory fakes.
    pub fn without_db(
        security: SecurityConfig,
        cache: ProfileCache,
        auth: AuthService,
        profiles: ProfileService,
        links: LinkService,
    ) -> Self {
        Self {
            db: None,
            security,
            cache,
            auth,
            profiles,
            links,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}
