//! Registration, login, refresh and logout.
//!
//! Access tokens travel in the response body and are the client's job to
//! keep; refresh tokens only ever travel in an httpOnly cookie scoped to
//! this route tree, so script code can never read them.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::users::UserProfile;
use crate::services::auth::{LoginInput, RegisterInput};
use crate::state::app_state::AppState;

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    user: UserProfile,
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct VerifyEmailRequest {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ResendVerificationRequest {
    email: String,
}

async fn register(
    input: web::Json<RegisterInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = app_state.auth.register(input.into_inner()).await?;

    let cookie = refresh_cookie(&outcome.tokens.refresh_token, &app_state);
    Ok(HttpResponse::Created().cookie(cookie).json(AuthResponse {
        user: outcome.profile,
        access_token: outcome.tokens.access_token,
    }))
}

async fn login(
    input: web::Json<LoginInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = app_state.auth.login(input.into_inner()).await?;

    let cookie = refresh_cookie(&outcome.tokens.refresh_token, &app_state);
    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        user: outcome.profile,
        access_token: outcome.tokens.access_token,
    }))
}

/// Rotate the pair: the presented refresh token is exchanged for a new
/// access token in the body and a new refresh cookie.
async fn refresh(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let tokens = app_state.auth.refresh(cookie.value()).await?;

    let cookie = refresh_cookie(&tokens.refresh_token, &app_state);
    Ok(HttpResponse::Ok().cookie(cookie).json(RefreshResponse {
        access_token: tokens.access_token,
    }))
}

async fn verify_email(
    input: web::Json<VerifyEmailRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = app_state.auth.verify_email(&input.token).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Always 204, whether or not the address has an unverified account.
async fn resend_verification(
    input: web::Json<ResendVerificationRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.auth.resend_verification(&input.email).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Server-side logout only clears the cookie; issued access tokens stay
/// valid until they expire.
async fn logout() -> HttpResponse {
    let mut cookie = expired_refresh_cookie();
    cookie.make_removal();
    HttpResponse::NoContent().cookie(cookie).finish()
}

fn refresh_cookie<'a>(token: &'a str, app_state: &AppState) -> Cookie<'a> {
    Cookie::build(REFRESH_COOKIE, token)
        .path("/api/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(
            app_state.security.refresh_ttl.as_secs() as i64,
        ))
        .finish()
}

fn expired_refresh_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .path("/api/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/verify-email", web::post().to(verify_email))
        .route("/resend-verification", web::post().to(resend_verification))
        .route("/logout", web::post().to(logout));
}
