pub mod fakes;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use backend::cache::ProfileCache;
use backend::mail::Mailer;
use backend::services::{AuthService, LinkService, ProfileService};
use backend::state::security_config::SecurityConfig;
use self::fakes::{MemoryCacheStore, MemoryLinkRepo, MemoryUserRepo, PlainHasher, RecordingMailer};
use time::OffsetDateTime;
use uuid::Uuid;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn unique_username(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}{n}")
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}@example.com", unique_username(prefix))
}

pub fn seeded_user(username: &str) -> backend::repos::users::User {
    let now = OffsetDateTime::now_utc();
    backend::repos::users::User {
        id: Uuid::new_v4(),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        bio: None,
        avatar_url: None,
        is_active: true,
        email_verified: false,
        password_hash: "hashed:password123".to_string(),
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Everything a service test needs, wired over in-memory fakes.
pub struct TestHarness {
    pub users: Arc<MemoryUserRepo>,
    pub links: Arc<MemoryLinkRepo>,
    pub store: Arc<MemoryCacheStore>,
    pub cache: ProfileCache,
    pub mailer: Arc<RecordingMailer>,
    pub security: SecurityConfig,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub link_service: LinkService,
}

/// App state over the harness services, for handler-level tests that go
/// through the router instead of calling services directly.
#[allow(dead_code)]
pub fn app_state(h: &TestHarness) -> backend::state::AppState {
    backend::state::AppState::without_db(
        h.security.clone(),
        h.cache.clone(),
        h.auth.clone(),
        h.profiles.clone(),
        h.link_service.clone(),
    )
}

pub fn harness() -> TestHarness {
    harness_with_security(SecurityConfig::default())
}

pub fn harness_with_security(security: SecurityConfig) -> TestHarness {
    let users = Arc::new(MemoryUserRepo::new());
    let links = Arc::new(MemoryLinkRepo::new());
    let store = Arc::new(MemoryCacheStore::new());
    let cache = ProfileCache::new(store.clone());
    let mailer = Arc::new(RecordingMailer::new());

    let auth = AuthService::new(
        users.clone(),
        Arc::new(PlainHasher),
        cache.clone(),
        security.clone(),
        mailer.clone() as Arc<dyn Mailer>,
    );
    let profiles = ProfileService::new(users.clone(), links.clone(), cache.clone());
    let link_service = LinkService::new(users.clone(), links.clone(), cache.clone());

    TestHarness {
        users,
        links,
        store,
        cache,
        mailer,
        security,
        auth,
        profiles,
        link_service,
    }
}
