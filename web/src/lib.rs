//! Axum HTTP API for Composable Todo.
//!
//! Serves the todo resource on `/api/todos` over a [`TodoService`], which in
//! turn talks to whichever `TodoRepository` the binary configured.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at the `todos` handler
//! 2. **Wait** for the configured artificial latency
//! 3. **Dispatch** on the method and extract query or JSON body
//! 4. **Call** the [`TodoService`] (validation, then storage)
//! 5. **Map** `TodoError` to [`AppError`], or the result to JSON
//!
//! # Example
//!
//! ```ignore
//! use composable_todo_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(service).with_latency(config.server.latency));
//! axum::serve(listener, app).await?;
//! ```
//!
//! [`TodoService`]: composable_todo_core::service::TodoService

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{AppEnvironment, Config, ConfigError, StorageBackend};
pub use error::AppError;
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
