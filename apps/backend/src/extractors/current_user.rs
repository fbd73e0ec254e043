use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::AppError;

/// Authenticated identity for the current request, built from the claims
/// the JwtExtract middleware stored in request extensions. Purely
/// token-derived; handlers that need the full user row go through the
/// services.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Claims>()
            .ok_or(AppError::UnauthorizedMissingBearer)
            .and_then(|claims| {
                let id = claims
                    .sub
                    .parse::<Uuid>()
                    .map_err(|_| AppError::UnauthorizedInvalidJwt)?;
                Ok(CurrentUser {
                    id,
                    email: claims.email.clone(),
                })
            });
        ready(result)
    }
}
