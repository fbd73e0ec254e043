use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::claims::Claims;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// An access/refresh token pair. Always issued and rotated together;
/// no partial pair is ever returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token class, selecting which secret and TTL apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Access,
    Refresh,
    Verification,
}

impl TokenClass {
    fn secret<'a>(&self, security: &'a SecurityConfig) -> &'a [u8] {
        match self {
            TokenClass::Access => &security.access_secret,
            TokenClass::Refresh => &security.refresh_secret,
            TokenClass::Verification => &security.verification_secret,
        }
    }

    fn ttl_secs(&self, security: &SecurityConfig) -> i64 {
        match self {
            TokenClass::Access => security.access_ttl.as_secs() as i64,
            TokenClass::Refresh => security.refresh_ttl.as_secs() as i64,
            TokenClass::Verification => security.verification_ttl.as_secs() as i64,
        }
    }
}

/// Mint a HS256 JWT access token for the given identity.
pub fn mint_access_token(
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    mint(TokenClass::Access, sub, email, now, security)
}

/// Mint a HS256 JWT refresh token for the given identity.
///
/// Refresh tokens are signed with their own secret, so an access token can
/// never be presented where a refresh token is expected (and vice versa).
pub fn mint_refresh_token(
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    mint(TokenClass::Refresh, sub, email, now, security)
}

/// Mint a single-purpose email verification token. Signed with its own
/// secret, so it is useless as an access or refresh token.
pub fn mint_verification_token(
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    mint(TokenClass::Verification, sub, email, now, security)
}

/// Mint an access + refresh pair. If either mint fails, the whole
/// operation fails and nothing is returned.
pub fn mint_token_pair(
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<TokenPair, AppError> {
    let access_token = mint_access_token(sub, email, now, security)?;
    let refresh_token = mint_refresh_token(sub, email, now, security)?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn mint(
    class: TokenClass,
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;
    let exp = iat + class.ttl_secs(security);

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        iat,
        exp,
    };

    // Signer misconfiguration only; not a normal-path error.
    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(class.secret(security)),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify an access token and return its claims.
///
/// Errors:
/// - Expired token → `AppError::UnauthorizedExpiredJwt`
/// - Invalid signature (including cross-class tokens) → `AppError::UnauthorizedInvalidJwt`
/// - Any other malformed input → `AppError::UnauthorizedInvalidJwt`
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    verify(TokenClass::Access, token, security)
}

/// Verify a refresh token and return its claims. Same error contract as
/// `verify_access_token`, checked against the refresh secret.
pub fn verify_refresh_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    verify(TokenClass::Refresh, token, security)
}

/// Verify an email verification token and return its claims.
pub fn verify_verification_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<Claims, AppError> {
    verify(TokenClass::Verification, token, security)
}

fn verify(class: TokenClass, token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let validation = Validation::new(security.algorithm);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(class.secret(security)),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::UnauthorizedExpiredJwt,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            tracing::debug!(class = ?class, "token signature verification failed");
            AppError::UnauthorizedInvalidJwt
        }
        _ => {
            tracing::debug!(class = ?class, "malformed token rejected: {e}");
            AppError::UnauthorizedInvalidJwt
        }
    })
}
