use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use backend::config::db::DbProfile;
use backend::infra::state::build_state;
use backend::middleware::cors::cors_middleware;
use backend::middleware::jwt_extract::JwtExtract;
use backend::middleware::rate_limit::{api_rate_limit_config, auth_rate_limit_config};
use backend::middleware::request_trace::RequestTrace;
use backend::routes;
use backend::state::security_config::SecurityConfig;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: via compose env_file or docker run --env-file
    // - Local dev: source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let security_config = match SecurityConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid security configuration: {e}");
            std::process::exit(1);
        }
    };

    let app_state = match build_state(DbProfile::Prod)
        .with_security(security_config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(host, port, "starting server");

    let data = web::Data::new(app_state);
    let auth_limit_backend = InMemoryBackend::builder().build();
    let api_limit_backend = InMemoryBackend::builder().build();

    HttpServer::new(move || {
        let auth_limiter = RateLimiter::builder(
            auth_limit_backend.clone(),
            auth_rate_limit_config().build(),
        )
        .add_headers()
        .build();
        let api_limiter = RateLimiter::builder(
            api_limit_backend.clone(),
            api_rate_limit_config().build(),
        )
        .add_headers()
        .build();

        App::new()
            .wrap(cors_middleware())
            .wrap(RequestTrace)
            .app_data(data.clone())
            .service(web::scope("/health").configure(routes::health::configure_routes))
            .service(
                web::scope("/api/auth")
                    .wrap(auth_limiter)
                    .configure(routes::auth::configure_routes),
            )
            .service(
                web::scope("/api/profile")
                    .wrap(JwtExtract)
                    .configure(routes::profile::configure_routes),
            )
            .service(
                web::scope("/api/links")
                    .wrap(JwtExtract)
                    .configure(routes::links::configure_routes),
            )
            .service(
                web::scope("/api/public")
                    .wrap(api_limiter)
                    .configure(routes::public::configure_routes),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
