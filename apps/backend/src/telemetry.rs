//! JSON log output for the server binary. `RUST_LOG` overrides the
//! defaults; SeaORM and redis are kept at warn to keep query noise out
//! of request logs.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "info,actix_web=info,sea_orm=warn,redis=warn";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .json(),
        )
        .init();
}
