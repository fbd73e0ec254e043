//! Error codes for the Linkfolio backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Linkfolio backend API.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in HTTP Problem Details responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Authentication required
    Unauthorized,
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Invalid JWT token
    UnauthorizedInvalidJwt,
    /// JWT token has expired
    UnauthorizedExpiredJwt,
    /// Email/password pair does not match a usable account
    InvalidCredentials,
    /// Account exists but is deactivated
    AccountInactive,
    /// Account exists but its email address is not verified
    EmailNotVerified,
    /// Access denied
    Forbidden,
    /// Caller does not own the targeted link
    NotLinkOwner,

    // Request Validation
    /// Invalid email address
    InvalidEmail,
    /// Invalid URL
    InvalidUrl,
    /// Invalid username
    InvalidUsername,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// User not found
    UserNotFound,
    /// Link not found
    LinkNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Unique email constraint
    UniqueEmail,
    /// Unique username constraint
    UniqueUsername,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Canonical SCREAMING_SNAKE_CASE string for HTTP responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            ErrorCode::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            ErrorCode::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::AccountInactive => "ACCOUNT_INACTIVE",
            ErrorCode::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotLinkOwner => "NOT_LINK_OWNER",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::InvalidUsername => "INVALID_USERNAME",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::LinkNotFound => "LINK_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UniqueEmail => "UNIQUE_EMAIL",
            ErrorCode::UniqueUsername => "UNIQUE_USERNAME",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::DbError => "DB_ERROR",
            ErrorCode::DbUnavailable => "DB_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
