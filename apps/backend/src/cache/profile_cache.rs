//! Typed cache-aside accessors and the write-path invalidation rules.
//!
//! `ProfileCache` is the only component services talk to; it owns JSON
//! (de)serialization and the mapping from entry class to key and TTL. The
//! store underneath is expected to be wrapped in
//! [`FailOpenCache`](crate::cache::store::FailOpenCache), so every method
//! here is infallible from the caller's point of view.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::cache::keys;
use crate::cache::store::CacheStore;
use crate::domain::views::{PublicProfile, SessionEntry};
use crate::domain::PlatformRules;
use crate::repos::links::Link;
use crate::repos::users::UserProfile;

#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn CacheStore>,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).await.ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // A corrupt entry is treated as a miss and dropped so the
                // next read repopulates it.
                warn!(key, "dropping undecodable cache entry: {err}");
                let _ = self.store.del(key).await;
                None
            }
        }
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                let _ = self.store.set_with_ttl(key, &raw, ttl_secs).await;
            }
            Err(err) => warn!(key, "failed to serialize cache entry: {err}"),
        }
    }

    pub async fn get_user_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.get_json(&keys::user_profile_key(user_id)).await
    }

    pub async fn put_user_profile(&self, profile: &UserProfile) {
        self.put_json(
            &keys::user_profile_key(profile.id),
            profile,
            keys::USER_PROFILE_TTL_SECS,
        )
        .await;
    }

    pub async fn get_public_profile(&self, username: &str) -> Option<PublicProfile> {
        self.get_json(&keys::public_profile_key(username)).await
    }

    pub async fn put_public_profile(&self, username: &str, profile: &PublicProfile) {
        self.put_json(
            &keys::public_profile_key(username),
            profile,
            keys::PUBLIC_PROFILE_TTL_SECS,
        )
        .await;
    }

    pub async fn get_user_links(&self, user_id: Uuid) -> Option<Vec<Link>> {
        self.get_json(&keys::links_key(user_id)).await
    }

    pub async fn put_user_links(&self, user_id: Uuid, links: &[Link]) {
        self.put_json(&keys::links_key(user_id), &links, keys::LINKS_TTL_SECS)
            .await;
    }

    pub async fn get_session(&self, user_id: Uuid) -> Option<SessionEntry> {
        self.get_json(&keys::session_key(user_id)).await
    }

    pub async fn put_session(&self, session: &SessionEntry) {
        self.put_json(
            &keys::session_key(session.user_id),
            session,
            keys::SESSION_TTL_SECS,
        )
        .await;
    }

    pub async fn get_platform_rules(&self) -> Option<PlatformRules> {
        self.get_json(keys::platforms_config_key()).await
    }

    pub async fn put_platform_rules(&self, rules: &PlatformRules) {
        self.put_json(
            keys::platforms_config_key(),
            rules,
            keys::PLATFORMS_CONFIG_TTL_SECS,
        )
        .await;
    }

    /// Profile fields changed: both profile views are stale.
    pub async fn invalidate_profile(&self, user_id: Uuid, username: &str) {
        let _ = self.store.del(&keys::user_profile_key(user_id)).await;
        let _ = self.store.del(&keys::public_profile_key(username)).await;
    }

    /// Links changed: the link list and the public view that embeds it are
    /// stale; the owner-facing profile does not include links.
    pub async fn invalidate_links(&self, user_id: Uuid, username: &str) {
        let _ = self.store.del(&keys::links_key(user_id)).await;
        let _ = self.store.del(&keys::public_profile_key(username)).await;
    }

    /// A username change must drop the public entry under the old username
    /// as well, otherwise the old vanity URL keeps serving the profile
    /// until its TTL expires.
    pub async fn invalidate_username_change(
        &self,
        user_id: Uuid,
        old_username: &str,
        new_username: &str,
    ) {
        let _ = self.store.del(&keys::user_profile_key(user_id)).await;
        let _ = self
            .store
            .del(&keys::public_profile_key(old_username))
            .await;
        let _ = self
            .store
            .del(&keys::public_profile_key(new_username))
            .await;
    }

    /// Account deletion drops every entry class for the user, the session
    /// included.
    pub async fn invalidate_user_deletion(&self, user_id: Uuid, username: &str) {
        let _ = self.store.del(&keys::user_profile_key(user_id)).await;
        let _ = self.store.del(&keys::public_profile_key(username)).await;
        let _ = self.store.del(&keys::links_key(user_id)).await;
        let _ = self.store.del(&keys::session_key(user_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::cache::store::CacheError;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }
        async fn set_with_ttl(
            &self,
            key: &str,
            value: &str,
            _ttl_secs: u64,
        ) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn profile(user_id: Uuid, username: &str) -> UserProfile {
        UserProfile {
            id: user_id,
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".into(),
            last_name: "User".into(),
            bio: None,
            avatar_url: None,
            is_active: true,
            email_verified: false,
            last_login_at: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_user_profile_roundtrip_and_invalidation() {
        let cache = ProfileCache::new(Arc::new(MemoryStore::default()));
        let user_id = Uuid::new_v4();
        let stored = profile(user_id, "alice");

        assert!(cache.get_user_profile(user_id).await.is_none());
        cache.put_user_profile(&stored).await;
        assert_eq!(cache.get_user_profile(user_id).await, Some(stored));

        cache.invalidate_profile(user_id, "alice").await;
        assert!(cache.get_user_profile(user_id).await.is_none());
    }

    #[tokio::test]
    async fn test_username_change_drops_both_public_entries() {
        let cache = ProfileCache::new(Arc::new(MemoryStore::default()));
        let user_id = Uuid::new_v4();

        let old_view = PublicProfile {
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: "A".into(),
            bio: None,
            avatar_url: None,
            links: vec![],
        };
        let new_view = PublicProfile {
            username: "alicia".into(),
            ..old_view.clone()
        };
        cache.put_public_profile("alice", &old_view).await;
        cache.put_public_profile("alicia", &new_view).await;

        cache
            .invalidate_username_change(user_id, "alice", "alicia")
            .await;

        assert!(cache.get_public_profile("alice").await.is_none());
        assert!(cache.get_public_profile("alicia").await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped_and_treated_as_miss() {
        let store = Arc::new(MemoryStore::default());
        let user_id = Uuid::new_v4();
        store
            .set_with_ttl(&keys::user_profile_key(user_id), "not json", 60)
            .await
            .unwrap();

        let cache = ProfileCache::new(store.clone());
        assert!(cache.get_user_profile(user_id).await.is_none());
        // The poisoned entry is gone, not just skipped.
        assert_eq!(
            store.get(&keys::user_profile_key(user_id)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_user_deletion_drops_all_entry_classes() {
        let store = Arc::new(MemoryStore::default());
        let cache = ProfileCache::new(store.clone());
        let user_id = Uuid::new_v4();

        cache.put_user_profile(&profile(user_id, "bob")).await;
        cache.put_user_links(user_id, &[]).await;
        cache
            .put_session(&SessionEntry {
                user_id,
                email: "bob@example.com".into(),
                username: "bob".into(),
                last_activity: OffsetDateTime::UNIX_EPOCH,
            })
            .await;

        cache.invalidate_user_deletion(user_id, "bob").await;

        assert!(store.entries.lock().unwrap().is_empty());
    }
}
