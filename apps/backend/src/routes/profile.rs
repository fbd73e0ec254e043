//! Owner-facing profile endpoints. Mounted behind JwtExtract.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::services::profiles::UpdateProfileInput;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvatarRequest {
    avatar_url: String,
}

async fn get_profile(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = app_state.profiles.get_profile(current_user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn get_session(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.auth.session(current_user.id).await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn update_profile(
    current_user: CurrentUser,
    input: web::Json<UpdateProfileInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = app_state
        .profiles
        .update_profile(current_user.id, input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn update_avatar(
    current_user: CurrentUser,
    input: web::Json<AvatarRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = app_state
        .profiles
        .update_avatar(current_user.id, input.into_inner().avatar_url)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn delete_avatar(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = app_state.profiles.delete_avatar(current_user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn delete_account(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.profiles.delete_account(current_user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_profile))
        .route("", web::put().to(update_profile))
        .route("", web::delete().to(delete_account))
        .route("/session", web::get().to(get_session))
        .route("/avatar", web::put().to(update_avatar))
        .route("/avatar", web::delete().to(delete_avatar));
}
