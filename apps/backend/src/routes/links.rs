//! Link management endpoints. Mounted behind JwtExtract.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::services::links::{CreateLinkInput, UpdateLinkInput};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest {
    link_ids: Vec<Uuid>,
}

async fn list_links(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let links = app_state.links.list_links(current_user.id).await?;
    Ok(HttpResponse::Ok().json(links))
}

async fn create_link(
    current_user: CurrentUser,
    input: web::Json<CreateLinkInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let link = app_state
        .links
        .create_link(current_user.id, input.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(link))
}

async fn update_link(
    current_user: CurrentUser,
    path: web::Path<Uuid>,
    input: web::Json<UpdateLinkInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let link = app_state
        .links
        .update_link(current_user.id, path.into_inner(), input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(link))
}

async fn toggle_link(
    current_user: CurrentUser,
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let link = app_state
        .links
        .toggle_link(current_user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(link))
}

async fn delete_link(
    current_user: CurrentUser,
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state
        .links
        .delete_link(current_user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn reorder_links(
    current_user: CurrentUser,
    input: web::Json<ReorderRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let links = app_state
        .links
        .reorder_links(current_user.id, input.into_inner().link_ids)
        .await?;
    Ok(HttpResponse::Ok().json(links))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_links))
        .route("", web::post().to(create_link))
        .route("/reorder", web::put().to(reorder_links))
        .route("/{id}", web::patch().to(update_link))
        .route("/{id}/toggle", web::post().to(toggle_link))
        .route("/{id}", web::delete().to(delete_link));
}
