//! Liveness endpoint.

use axum::http::StatusCode;

/// Returns 200 `ok` while the process is serving requests.
///
/// Does not touch storage and skips the artificial latency.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
