//! Router configuration for the todo server.

use crate::error::AppError;
use crate::handlers::{health_check, todos};
use crate::middleware::PreflightCorsLayer;
use crate::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use composable_todo_core::api::TODOS_PATH;
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build the complete Axum router.
///
/// - `GET /health`: liveness
/// - `/api/todos`: every method goes to [`todos`], which answers 405 itself
///
/// Requests are traced and CORS allows the four todo methods from any
/// origin. A plain `OPTIONS` (no `Access-Control-Request-Method`) skips CORS
/// and gets the handler's 405. A panic inside a handler becomes a 500
/// instead of a dropped connection.
pub fn build_router(state: AppState) -> Router {
    let expose_errors = state.environment.exposes_errors();

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route(TODOS_PATH, any(todos))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(PreflightCorsLayer::new(cors))
                .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
                    panic_response(panic.as_ref(), expose_errors)
                })),
        )
}

fn panic_response(panic: &(dyn Any + Send), expose_errors: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    AppError::internal("Server error")
        .with_source(anyhow::anyhow!(detail))
        .expose_source(expose_errors)
        .into_response()
}
