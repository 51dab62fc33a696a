//! `TodoApi` over HTTP.

use composable_todo_core::api::{
    ApiError, ApiFuture, CreateTodoRequest, ErrorBody, ListTodosResponse, MessageResponse,
    TodoApi, UpdateTodoRequest,
};
use composable_todo_core::pagination::PageRequest;
use composable_todo_core::todo::{Todo, TodoId};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Endpoint used when `TODO_API_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/todos";

/// Errors building an [`HttpTodoApi`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The endpoint is not an absolute URL
    #[error("Invalid todo API URL {url}: {reason}")]
    InvalidBaseUrl {
        /// URL as given
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Todo API client speaking JSON to `/api/todos`
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: Url,
}

impl HttpTodoApi {
    /// Create a client for the todo resource at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            base_url: parsed,
        })
    }

    /// Create a client for `TODO_API_URL`, or [`DEFAULT_BASE_URL`]
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the URL does not parse.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url =
            std::env::var("TODO_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    /// The todo resource URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    async fn call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| status.canonical_reason().unwrap_or("Request failed").to_string(),
            |error| error.message,
        );
        tracing::debug!(status = status.as_u16(), %message, "Todo API request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl TodoApi for HttpTodoApi {
    fn list_todos(&self, request: PageRequest) -> ApiFuture<'_, ListTodosResponse> {
        let builder = self.client.get(self.base_url.clone()).query(&[
            ("page", request.page()),
            ("pageSize", request.page_size()),
        ]);
        Box::pin(Self::call(builder))
    }

    fn create_todo(&self, title: String) -> ApiFuture<'_, Todo> {
        let builder = self
            .client
            .post(self.base_url.clone())
            .json(&CreateTodoRequest { title: Some(title) });
        Box::pin(Self::call(builder))
    }

    fn update_todo(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo> {
        let builder = self.client.put(self.base_url.clone()).json(&UpdateTodoRequest {
            id: Some(id),
            completed: Some(completed),
        });
        Box::pin(Self::call(builder))
    }

    fn delete_todo(&self, id: TodoId) -> ApiFuture<'_, MessageResponse> {
        let builder = self
            .client
            .delete(self.base_url.clone())
            .query(&[("id", id.get())]);
        Box::pin(Self::call(builder))
    }
}
