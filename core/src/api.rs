//! HTTP contract shared by the server and the client.
//!
//! The JSON bodies exchanged on `/api/todos` and the client-side
//! [`TodoApi`] port. The server deserializes the request types and
//! serializes the response types; the client does the opposite.

use crate::pagination::{Page, PageRequest};
use crate::todo::{Todo, TodoId};
use serde::{Deserialize, Deserializer, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Path of the todo resource
pub const TODOS_PATH: &str = "/api/todos";

/// Methods accepted on [`TODOS_PATH`], as sent in the `Allow` header
pub const ALLOWED_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Body of a `GET /api/todos` response
pub type ListTodosResponse = Page<Todo>;

/// Body of `POST /api/todos`
///
/// A `title` that is missing, `null`, or not a string deserializes to `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    /// Raw title; trimmed by the server
    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,
}

/// Body of `PUT /api/todos`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    /// Todo to update
    #[serde(default)]
    pub id: Option<TodoId>,
    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,
}

/// `{ "message": ... }` body, used for delete confirmations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// Body of every error response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-facing message
    pub message: String,
    /// Machine-readable code such as `NOT_FOUND`
    #[serde(default)]
    pub code: String,
    /// Underlying error text; only sent for 500s in development mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    })
}

/// Failure of a [`TodoApi`] call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the status reason
        message: String,
    },

    /// The request never got a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not what the contract promises
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Boxed future returned by every [`TodoApi`] method
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The four todo operations, as seen from a client
///
/// Implemented over HTTP by `HttpTodoApi` (in `composable-todo-client`) and
/// in memory by `FakeTodoApi` (in `composable-todo-testing`).
pub trait TodoApi: Send + Sync {
    /// `GET /api/todos?page=..&pageSize=..`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    fn list_todos(&self, request: PageRequest) -> ApiFuture<'_, ListTodosResponse>;

    /// `POST /api/todos` with `{ title }`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    fn create_todo(&self, title: String) -> ApiFuture<'_, Todo>;

    /// `PUT /api/todos` with `{ id, completed }`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    fn update_todo(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo>;

    /// `DELETE /api/todos?id=..`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    fn delete_todo(&self, id: TodoId) -> ApiFuture<'_, MessageResponse>;
}
