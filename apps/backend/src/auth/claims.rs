//! Identity claims carried inside backend-issued tokens.

use serde::{Deserialize, Serialize};

/// Claims included in both access and refresh tokens.
///
/// This is a closed struct: tokens carry exactly these fields, and
/// verification rejects payloads that cannot be deserialized into it.
/// The authentication middleware inserts a verified `Claims` value into
/// request extensions for downstream handlers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User identifier (users.id as string)
    pub sub: String,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}
