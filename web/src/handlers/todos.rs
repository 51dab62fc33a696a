//! The `/api/todos` resource.
//!
//! One handler serves every method on the path. It waits for the configured
//! latency, then dispatches:
//!
//! | Method | Input | Success |
//! |---|---|---|
//! | GET | `page`, `pageSize` query | 200 `{ data, pagination }` |
//! | POST | `{ title }` body | 201 todo |
//! | PUT | `{ id, completed }` body | 200 todo |
//! | DELETE | `id` query | 200 `{ message }` |
//!
//! Anything else is a 405 with an `Allow` header.

use crate::WebResult;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use composable_todo_core::api::{CreateTodoRequest, MessageResponse, UpdateTodoRequest};
use composable_todo_core::pagination::PageRequest;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Query parameters accepted on `/api/todos`
///
/// Kept as raw text; the service decides what is valid.
#[derive(Debug, Default, Deserialize)]
pub struct TodosQuery {
    /// 1-based page for GET
    pub page: Option<String>,
    /// Page size for GET
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    /// Target id for DELETE
    pub id: Option<String>,
}

/// Handle any request on `/api/todos`.
///
/// # Errors
///
/// Returns [`AppError`] with status 400, 404, 405, or 500 as described in
/// the module docs.
#[tracing::instrument(skip_all, fields(method = %method))]
pub async fn todos(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<TodosQuery>, QueryRejection>,
    body: Bytes,
) -> WebResult<Response> {
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let result = dispatch(&state, &method, query, &body).await;

    let status = match &result {
        Ok(response) => response.status(),
        Err(error) => error.status(),
    };
    metrics::counter!(
        "todo.api.requests",
        "method" => method_label(&method),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    result.map_err(|error| error.expose_source(state.environment.exposes_errors()))
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    query: Result<Query<TodosQuery>, QueryRejection>,
    body: &Bytes,
) -> WebResult<Response> {
    match *method {
        Method::GET => {
            let query = query.map_or_else(
                |rejection| {
                    tracing::debug!(%rejection, "Unreadable paging query, using defaults");
                    TodosQuery::default()
                },
                |Query(query)| query,
            );
            let request = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref());
            let page = state.service.list(request).await?;
            Ok(Json(page).into_response())
        },
        Method::POST => {
            let request: CreateTodoRequest = parse_body(body)?;
            let todo = state.service.create(request.title.as_deref()).await?;
            Ok((StatusCode::CREATED, Json(todo)).into_response())
        },
        Method::PUT => {
            let request: UpdateTodoRequest = parse_body(body)?;
            let todo = state.service.set_completed(request.id, request.completed).await?;
            Ok(Json(todo).into_response())
        },
        Method::DELETE => {
            let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
            state.service.delete(query.id.as_deref()).await?;
            Ok(Json(MessageResponse {
                message: "Deleted successfully".to_string(),
            })
            .into_response())
        },
        _ => Err(AppError::method_not_allowed(method)),
    }
}

/// Metric label for `method`; extension methods share one label.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "other",
    }
}

/// Parse a JSON body; an empty body reads as `{}`.
fn parse_body<T>(body: &Bytes) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(%error, "Rejected malformed JSON body");
        AppError::bad_request("Invalid JSON body")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        let request: UpdateTodoRequest = parse_body(&Bytes::from_static(b"  ")).unwrap();
        assert_eq!(request, UpdateTodoRequest::default());
    }

    #[test]
    fn unsupported_methods_share_a_metric_label() {
        assert_eq!(method_label(&Method::DELETE), "DELETE");
        assert_eq!(method_label(&Method::PATCH), "other");
        let custom = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(method_label(&custom), "other");
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let error = parse_body::<CreateTodoRequest>(&Bytes::from_static(b"{title:")).unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "Invalid JSON body");
    }
}
