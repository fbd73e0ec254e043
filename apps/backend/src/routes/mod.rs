use actix_web::web;

pub mod auth;
pub mod health;
pub mod links;
pub mod profile;
pub mod public;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// In production, `main.rs` wires these under scopes with additional
/// middleware (rate limiting, JWT extraction). For tests we register the
/// same paths without those wrappers so that endpoint behavior can be
/// exercised directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));
    cfg.service(web::scope("/api/profile").configure(profile::configure_routes));
    cfg.service(web::scope("/api/links").configure(links::configure_routes));
    cfg.service(web::scope("/api/public").configure(public::configure_routes));
}
