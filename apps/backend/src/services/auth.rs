//! Registration, login and token refresh.

use std::sync::Arc;
use std::time::SystemTime;

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{
    mint_token_pair, mint_verification_token, verify_refresh_token, verify_verification_token,
    TokenPair,
};
use crate::auth::password::PasswordHasher;
use crate::cache::ProfileCache;
use crate::domain::views::SessionEntry;
use crate::error::AppError;
use crate::errors::domain::{AuthFailureKind, DomainError};
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::mail::Mailer;
use crate::repos::users::{NewUser, User, UserProfile, UserRepo};
use crate::state::security_config::SecurityConfig;

const PASSWORD_MIN_LEN: usize = 8;
const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Identity plus the freshly minted token pair, returned by register and
/// login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub profile: UserProfile,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    hasher: Arc<dyn PasswordHasher>,
    cache: ProfileCache,
    security: SecurityConfig,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        hasher: Arc<dyn PasswordHasher>,
        cache: ProfileCache,
        security: SecurityConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            hasher,
            cache,
            security,
            mailer,
        }
    }

    /// Create an account and issue the first token pair. The welcome email
    /// is sent off the request path; a send failure never fails the
    /// registration.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthOutcome, AppError> {
        validate_email(&input.email)?;
        validate_username(&input.username)?;
        validate_password(&input.password)?;
        if input.first_name.trim().is_empty() {
            return Err(AppError::validation(
                ErrorCode::ValidationError,
                "First name is required",
            ));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                email: input.email.trim().to_lowercase(),
                username: input.username.trim().to_lowercase(),
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %Redacted(&user.email), "user registered");

        let mailer = Arc::clone(&self.mailer);
        let (email, first_name) = (user.email.clone(), user.first_name.clone());
        tokio::spawn(async move {
            if let Err(err) = mailer.send_welcome(&email, &first_name).await {
                warn!(email = %Redacted(&email), "welcome email failed: {err}");
            }
        });

        if self.security.require_verified_email {
            self.dispatch_verification(&user)?;
        }

        self.issue_tokens(user).await
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password produce the same error; the
    /// distinction must not be observable. Account-state checks run only
    /// after the password has been verified.
    pub async fn login(&self, input: LoginInput) -> Result<AuthOutcome, AppError> {
        let email = input.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(unknown_credentials)?;

        if !self.hasher.verify(&input.password, &user.password_hash) {
            return Err(unknown_credentials().into());
        }
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }
        if self.security.require_verified_email && !user.email_verified {
            return Err(AppError::EmailNotVerified);
        }

        // Best effort: a failed timestamp update must not block the login.
        if let Err(err) = self.users.touch_last_login(user.id).await {
            warn!(user_id = %user.id, "failed to record last login: {err}");
        }

        tracing::info!(user_id = %user.id, "login succeeded");
        self.issue_tokens(user).await
    }

    /// Exchange a valid refresh token for a brand-new pair. Rotation by
    /// reissue: both tokens are replaced, claims are re-read from
    /// persistence so a stale email in the old token does not survive.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = verify_refresh_token(refresh_token, &self.security)?;

        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| AppError::UnauthorizedInvalidJwt)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        let tokens = mint_token_pair(
            &user.id.to_string(),
            &user.email,
            SystemTime::now(),
            &self.security,
        )?;
        self.put_session(&user).await;
        Ok(tokens)
    }

    /// Redeem an email verification token. Idempotent: a token presented
    /// after the flag is already set still succeeds.
    pub async fn verify_email(&self, token: &str) -> Result<UserProfile, AppError> {
        let claims = verify_verification_token(token, &self.security)?;
        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| AppError::UnauthorizedInvalidJwt)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.email_verified {
            return Ok(UserProfile::from(user));
        }

        let user = self.users.mark_email_verified(user.id).await?;
        self.cache.invalidate_profile(user.id, &user.username).await;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(UserProfile::from(user))
    }

    /// Mail a fresh verification token. Returns Ok for unknown and
    /// already-verified addresses alike, so the endpoint leaks nothing
    /// about which emails have accounts.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim().to_lowercase();
        match self.users.find_by_email(&email).await? {
            Some(user) if !user.email_verified => self.dispatch_verification(&user),
            _ => Ok(()),
        }
    }

    /// Session entry for an authenticated user, cache-aside: a miss is
    /// rebuilt from persistence and written back.
    pub async fn session(&self, user_id: Uuid) -> Result<SessionEntry, AppError> {
        if let Some(entry) = self.cache.get_session(user_id).await {
            return Ok(entry);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        let entry = SessionEntry {
            user_id: user.id,
            email: user.email,
            username: user.username,
            last_activity: OffsetDateTime::now_utc(),
        };
        self.cache.put_session(&entry).await;
        Ok(entry)
    }

    fn dispatch_verification(&self, user: &User) -> Result<(), AppError> {
        let token = mint_verification_token(
            &user.id.to_string(),
            &user.email,
            SystemTime::now(),
            &self.security,
        )?;

        let mailer = Arc::clone(&self.mailer);
        let email = user.email.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer.send_verification(&email, &token).await {
                warn!(email = %Redacted(&email), "verification email failed: {err}");
            }
        });
        Ok(())
    }

    /// Registration-time availability check for the signup form.
    pub async fn username_available(&self, username: &str) -> Result<bool, AppError> {
        validate_username(username)?;
        let existing = self.users.find_by_username(&username.to_lowercase()).await?;
        Ok(existing.is_none())
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthOutcome, AppError> {
        let tokens = mint_token_pair(
            &user.id.to_string(),
            &user.email,
            SystemTime::now(),
            &self.security,
        )?;
        self.put_session(&user).await;
        Ok(AuthOutcome {
            profile: UserProfile::from(user),
            tokens,
        })
    }

    async fn put_session(&self, user: &User) {
        self.cache
            .put_session(&SessionEntry {
                user_id: user.id,
                email: user.email.clone(),
                username: user.username.clone(),
                last_activity: OffsetDateTime::now_utc(),
            })
            .await;
    }
}

fn unknown_credentials() -> DomainError {
    DomainError::auth(AuthFailureKind::InvalidCredentials, "credentials rejected")
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if !well_formed {
        return Err(AppError::validation(
            ErrorCode::InvalidEmail,
            "Email address is not valid",
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    let len_ok = (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len());
    let chars_ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !len_ok || !chars_ok {
        return Err(AppError::validation(
            ErrorCode::InvalidUsername,
            format!(
                "Username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters of letters, digits or underscores"
            ),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            format!("Password must be at least {PASSWORD_MIN_LEN} characters"),
        ));
    }
    Ok(())
}
