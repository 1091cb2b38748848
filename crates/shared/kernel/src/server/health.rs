use axum::http::header;
use axum::{Json, response::IntoResponse};
use scaffold_derive::{api_handler, api_model};
use scaffold_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Health check response
struct HealthResponse {
    /// Status
    status: &'static str,
    /// Version
    version: &'static str,
    /// Uptime in seconds
    uptime: u64,
}

#[api_model]
/// Liveness probe response
struct AliveResponse {
    status: &'static str,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

fn no_cache() -> [(header::HeaderName, &'static str); 2] {
    [
        (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        (header::PRAGMA, "no-cache"),
    ]
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (no_cache(), Json(body))
}

#[api_handler(
    get,
    path = "/alive",
    responses((status = OK, description = "Liveness probe", body = AliveResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn alive_handler() -> impl IntoResponse {
    (no_cache(), Json(AliveResponse { status: "alive" }))
}
