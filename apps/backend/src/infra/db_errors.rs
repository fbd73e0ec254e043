//! SeaORM -> DomainError translation helpers.
//!
//! Adapters convert `sea_orm::DbErr` into `crate::errors::domain::DomainError`
//! here; higher layers then map `DomainError` to `AppError` via `From`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Map unique-constraint names to domain-specific conflict errors.
fn map_unique_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("ux_users_email") || error_msg.contains("users_email_key") {
        return Some((ConflictKind::UniqueEmail, "Email already registered"));
    }
    if error_msg.contains("ux_users_username") || error_msg.contains("users_username_key") {
        return Some((ConflictKind::UniqueUsername, "Username already taken"));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::Conn(_) => {
            error!("database unavailable: {error_msg}");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    // Unique violation (SQLSTATE 23505)
    if mentions_sqlstate(&error_msg, "23505") || error_msg.contains("UNIQUE constraint failed") {
        if let Some((kind, detail)) = map_unique_constraint_to_conflict(&error_msg) {
            warn!("unique constraint violation: {detail}");
            return DomainError::conflict(kind, detail);
        }
        warn!("unmapped unique constraint violation");
        return DomainError::conflict(ConflictKind::Other("Unique".into()), "Duplicate record");
    }

    error!("unmapped database error: {error_msg}");
    DomainError::infra(InfraErrorKind::Other("Database".into()), "Database error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_email_violation_maps_to_conflict() {
        let err = sea_orm::DbErr::Custom(
            "error returned from database: duplicate key value violates unique constraint \"ux_users_email\" SQLSTATE(23505)".to_string(),
        );
        match map_db_err(err) {
            DomainError::Conflict(ConflictKind::UniqueEmail, _) => {}
            other => panic!("expected UniqueEmail conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_unique_username_violation_maps_to_conflict() {
        let err = sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: ux_users_username SQLSTATE(23505)".to_string(),
        );
        match map_db_err(err) {
            DomainError::Conflict(ConflictKind::UniqueUsername, _) => {}
            other => panic!("expected UniqueUsername conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_error_maps_to_infra() {
        let err = sea_orm::DbErr::Custom("something odd".to_string());
        assert!(matches!(map_db_err(err), DomainError::Infra(_, _)));
    }
}
