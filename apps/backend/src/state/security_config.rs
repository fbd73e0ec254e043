use std::env;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::AppError;

const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_VERIFICATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for token security settings.
///
/// Access and refresh tokens are signed with distinct secrets so that
/// possession of one class never allows forging the other.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret for signing and verifying access tokens
    pub access_secret: Vec<u8>,
    /// Secret for signing and verifying refresh tokens
    pub refresh_secret: Vec<u8>,
    /// Secret for signing and verifying email verification tokens
    pub verification_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Access token lifetime (default 15 minutes)
    pub access_ttl: Duration,
    /// Refresh token lifetime (default 7 days)
    pub refresh_ttl: Duration,
    /// Email verification token lifetime (default 24 hours)
    pub verification_ttl: Duration,
    /// Whether login requires a verified email address
    pub require_verified_email: bool,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given secrets and default TTLs.
    ///
    /// The verification secret defaults to a value derived from the refresh
    /// secret; it stays distinct from both signing secrets so a verification
    /// token can never pass as an access or refresh token.
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        let refresh_secret = refresh_secret.into();
        let verification_secret = [refresh_secret.as_slice(), b":email-verification"].concat();
        Self {
            access_secret: access_secret.into(),
            refresh_secret,
            verification_secret,
            algorithm: Algorithm::HS256,
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            verification_ttl: DEFAULT_VERIFICATION_TTL,
            require_verified_email: false,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_require_verified_email(mut self, require: bool) -> Self {
        self.require_verified_email = require;
        self
    }

    /// Load from environment variables.
    ///
    /// `AUTH_ACCESS_SECRET` and `AUTH_REFRESH_SECRET` are required;
    /// `AUTH_VERIFICATION_SECRET`, `AUTH_ACCESS_TTL_SECS`,
    /// `AUTH_REFRESH_TTL_SECS`, `AUTH_VERIFICATION_TTL_SECS` and
    /// `AUTH_REQUIRE_VERIFIED_EMAIL` are optional overrides.
    pub fn from_env() -> Result<Self, AppError> {
        let access = must_var("AUTH_ACCESS_SECRET")?;
        let refresh = must_var("AUTH_REFRESH_SECRET")?;
        if access == refresh {
            return Err(AppError::config(
                "AUTH_ACCESS_SECRET and AUTH_REFRESH_SECRET must differ",
            ));
        }

        let mut config = Self::new(access.into_bytes(), refresh.into_bytes());

        if let Ok(secret) = env::var("AUTH_VERIFICATION_SECRET") {
            config.verification_secret = secret.into_bytes();
        }
        if let Ok(secs) = env::var("AUTH_ACCESS_TTL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                AppError::config("AUTH_ACCESS_TTL_SECS must be a number of seconds")
            })?;
            config.access_ttl = Duration::from_secs(secs);
        }
        if let Ok(secs) = env::var("AUTH_REFRESH_TTL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                AppError::config("AUTH_REFRESH_TTL_SECS must be a number of seconds")
            })?;
            config.refresh_ttl = Duration::from_secs(secs);
        }
        if let Ok(secs) = env::var("AUTH_VERIFICATION_TTL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                AppError::config("AUTH_VERIFICATION_TTL_SECS must be a number of seconds")
            })?;
            config.verification_ttl = Duration::from_secs(secs);
        }
        config.require_verified_email = env::var("AUTH_REQUIRE_VERIFIED_EMAIL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(config)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(
            b"default_access_secret_for_tests_only".to_vec(),
            b"default_refresh_secret_for_tests_only".to_vec(),
        )
    }
}

fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
