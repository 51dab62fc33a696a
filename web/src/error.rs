//! Error types for web handlers.
//!
//! [`AppError`] bridges [`TodoError`] and HTTP, implementing Axum's
//! `IntoResponse` so handlers can use `?`.

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use composable_todo_core::api::{ALLOWED_METHODS, ErrorBody};
use composable_todo_core::error::TodoError;
use std::fmt;

/// Application error type for web handlers.
///
/// The body is always `{ "message", "code" }`. When detail exposure is on
/// (development mode) a 500 also carries the source error as `error`.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Todo>, AppError> {
///     let todo = state.service.set_completed(id, completed).await?;
///     Ok(Json(todo))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (logged; only sent when `expose_source` is set)
    source: Option<anyhow::Error>,
    /// Whether a 500 body may include `source`
    expose_source: bool,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
            expose_source: false,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Allow the source error text into 500 bodies.
    #[must_use]
    pub const fn expose_source(mut self, expose: bool) -> Self {
        self.expose_source = expose;
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Create a 405 Method Not Allowed error. The response carries `Allow`.
    #[must_use]
    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {method} Not Allowed"),
            "METHOD_NOT_ALLOWED",
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_SERVER_ERROR")
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let error = if self.expose_source && self.status.is_server_error() {
            self.source.as_ref().map(|source| format!("{source:#}"))
        } else {
            None
        };

        let body = ErrorBody {
            message: self.message,
            code: self.code.to_string(),
            error,
        };

        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            if let Ok(allow) = HeaderValue::from_str(&ALLOWED_METHODS.join(", ")) {
                response.headers_mut().insert(header::ALLOW, allow);
            }
        }
        response
    }
}

impl From<TodoError> for AppError {
    fn from(error: TodoError) -> Self {
        match error {
            TodoError::Validation(message) => Self::bad_request(message),
            error @ TodoError::NotFound(_) => Self::not_found(error.to_string()),
            TodoError::Storage(source) => {
                Self::internal("Server error").with_source(anyhow::Error::new(source))
            },
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Server error").with_source(err)
    }
}
