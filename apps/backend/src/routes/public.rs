//! Unauthenticated endpoints: the public profile page and the signup
//! form's username availability check.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    available: bool,
}

async fn public_profile(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .profiles
        .get_public_profile(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn username_available(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let available = app_state
        .auth
        .username_available(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(AvailabilityResponse { available }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Specific route first so "availability" is never treated as a
    // profile name.
    cfg.route(
        "/availability/{username}",
        web::get().to(username_available),
    )
    .route("/{username}", web::get().to(public_profile));
}
