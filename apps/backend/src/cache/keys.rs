//! Cache key namespaces and per-class TTLs.
//!
//! Persistence is always authoritative; every entry written under these
//! namespaces is a disposable projection whose staleness is bounded by the
//! TTL below plus explicit invalidation on writes.

use uuid::Uuid;

/// Session data: 24 hours.
pub const SESSION_TTL_SECS: u64 = 24 * 60 * 60;
/// Public profile view: 5 minutes. Highest-traffic path, shortest staleness
/// window; it is also the most frequently invalidated entry class.
pub const PUBLIC_PROFILE_TTL_SECS: u64 = 5 * 60;
/// Owner-facing profile: 10 minutes.
pub const USER_PROFILE_TTL_SECS: u64 = 10 * 60;
/// A user's link list: 10 minutes.
pub const LINKS_TTL_SECS: u64 = 10 * 60;
/// Rate-limit bucket: 1 hour.
pub const RATE_LIMIT_TTL_SECS: u64 = 60 * 60;
/// Platform configuration: 24 hours; changes rarely.
pub const PLATFORMS_CONFIG_TTL_SECS: u64 = 24 * 60 * 60;

pub fn session_key(user_id: Uuid) -> String {
    format!("session:{user_id}")
}

pub fn public_profile_key(username: &str) -> String {
    format!("profile:public:{username}")
}

pub fn user_profile_key(user_id: Uuid) -> String {
    format!("profile:user:{user_id}")
}

pub fn links_key(user_id: Uuid) -> String {
    format!("links:user:{user_id}")
}

/// Reserved bucket namespace for a shared-store rate limiter. The server
/// currently runs `actix-extensible-rate-limit` on an in-memory backend
/// (`middleware/rate_limit.rs`); a multi-instance deployment would move
/// its buckets under these keys.
pub fn rate_limit_key(endpoint: &str, identifier: &str) -> String {
    format!("ratelimit:{endpoint}:{identifier}")
}

pub fn platforms_config_key() -> &'static str {
    "platforms:config"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_and_distinct() {
        let user_id = Uuid::new_v4();
        assert_eq!(session_key(user_id), format!("session:{user_id}"));
        assert_eq!(user_profile_key(user_id), format!("profile:user:{user_id}"));
        assert_eq!(links_key(user_id), format!("links:user:{user_id}"));
        assert_eq!(public_profile_key("alice"), "profile:public:alice");
        assert_eq!(rate_limit_key("login", "1.2.3.4"), "ratelimit:login:1.2.3.4");
        assert_eq!(platforms_config_key(), "platforms:config");
    }

    #[test]
    fn test_public_profile_has_the_shortest_ttl() {
        // The invariant behind the TTL table: the public view tolerates the
        // least staleness.
        assert!(PUBLIC_PROFILE_TTL_SECS <= USER_PROFILE_TTL_SECS);
        assert!(PUBLIC_PROFILE_TTL_SECS <= LINKS_TTL_SECS);
        assert!(PUBLIC_PROFILE_TTL_SECS <= SESSION_TTL_SECS);
        assert!(PUBLIC_PROFILE_TTL_SECS <= PLATFORMS_CONFIG_TTL_SECS);
    }
}
