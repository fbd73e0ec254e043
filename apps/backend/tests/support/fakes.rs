//! In-memory fakes for the persistence, cache and mail seams.
//!
//! The repos count their reads so tests can assert whether a request was
//! served from the cache or fell through to persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use backend::auth::password::PasswordHasher;
use backend::cache::store::{CacheError, CacheStore};
use backend::error::AppError;
use backend::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use backend::mail::{MailError, Mailer};
use backend::repos::links::{Link, LinkChanges, LinkRepo, NewLink};
use backend::repos::users::{NewUser, ProfileChanges, User, UserRepo};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
    pub find_by_id_calls: AtomicUsize,
    pub find_by_email_calls: AtomicUsize,
    pub find_by_username_calls: AtomicUsize,
    pub touch_last_login_calls: AtomicUsize,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing the create path.
    pub fn seed(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn reads(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
            + self.find_by_email_calls.load(Ordering::SeqCst)
            + self.find_by_username_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_by_email_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_by_username_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DomainError::conflict(
                ConflictKind::UniqueEmail,
                "Email already registered",
            ));
        }
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(DomainError::conflict(
                ConflictKind::UniqueUsername,
                "Username already taken",
            ));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            username: new_user.username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            bio: None,
            avatar_url: None,
            is_active: true,
            email_verified: false,
            password_hash: new_user.password_hash,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn set_avatar_url(
        &self,
        id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?;
        user.avatar_url = avatar_url;
        Ok(user.clone())
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?;
        user.email_verified = true;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
        self.touch_last_login_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "No such user"))?;
        user.last_login_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLinkRepo {
    links: Mutex<Vec<Link>>,
    pub list_by_user_calls: AtomicUsize,
    pub list_active_calls: AtomicUsize,
}

impl MemoryLinkRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, link: Link) {
        self.links.lock().unwrap().push(link);
    }
}

#[async_trait]
impl LinkRepo for MemoryLinkRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, DomainError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError> {
        self.list_by_user_calls.fetch_add(1, Ordering::SeqCst);
        let mut links: Vec<Link> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        links.sort_by_key(|l| l.display_order);
        Ok(links)
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Link>, DomainError> {
        self.list_active_calls.fetch_add(1, Ordering::SeqCst);
        let mut links: Vec<Link> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && l.is_active)
            .cloned()
            .collect();
        links.sort_by_key(|l| l.display_order);
        Ok(links)
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, DomainError> {
        let now = OffsetDateTime::now_utc();
        let link = Link {
            id: Uuid::new_v4(),
            user_id: new_link.user_id,
            platform: new_link.platform,
            url: new_link.url,
            title: new_link.title,
            display_order: new_link.display_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.links.lock().unwrap().push(link.clone());
        Ok(link)
    }

    async fn update(&self, id: Uuid, changes: LinkChanges) -> Result<Link, DomainError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Link, "No such link"))?;
        if let Some(platform) = changes.platform {
            link.platform = platform;
        }
        if let Some(url) = changes.url {
            link.url = url;
        }
        if let Some(title) = changes.title {
            link.title = title;
        }
        link.updated_at = OffsetDateTime::now_utc();
        Ok(link.clone())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Link, DomainError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Link, "No such link"))?;
        link.is_active = is_active;
        Ok(link.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.links.lock().unwrap().retain(|l| l.id != id);
        Ok(())
    }

    async fn reorder(&self, user_id: Uuid, ordered_ids: &[Uuid]) -> Result<(), DomainError> {
        let mut links = self.links.lock().unwrap();
        for (position, id) in ordered_ids.iter().enumerate() {
            let link = links
                .iter_mut()
                .find(|l| l.id == *id && l.user_id == user_id)
                .ok_or_else(|| DomainError::not_found(NotFoundKind::Link, "No such link"))?;
            link.display_order = position as i32;
        }
        Ok(())
    }
}

/// Cache store over a plain map, with call counters and recorded TTLs.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
    pub ttls: Mutex<HashMap<String, u64>>,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub del_calls: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.ttls.lock().unwrap().insert(key.to_string(), ttl_secs);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.del_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().remove(key);
        self.ttls.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Cache store where every operation fails, standing in for an
/// unreachable Redis.
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError("connection refused".into()))
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: &str,
        _ttl_secs: u64,
    ) -> Result<(), CacheError> {
        Err(CacheError("connection refused".into()))
    }

    async fn del(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError("connection refused".into()))
    }
}

/// Mailer that records sends instead of delivering anything.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub verifications: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.lock().unwrap().len()
    }

    /// The most recent verification token mailed to the given address.
    pub fn last_verification_token(&self, email: &str) -> Option<String> {
        self.verifications
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), first_name.to_string()));
        Ok(())
    }

    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError> {
        self.verifications
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

/// Deterministic hasher for tests; marks the hash so the plaintext is
/// visibly absent from stored state.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        Ok(format!("hashed:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        stored_hash == format!("hashed:{plaintext}")
    }
}
