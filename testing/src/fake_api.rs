//! In-process `TodoApi` for client tests.

use crate::mocks::test_clock;
use composable_todo_core::api::{ApiError, ApiFuture, ListTodosResponse, MessageResponse, TodoApi};
use composable_todo_core::error::TodoError;
use composable_todo_core::memory::InMemoryTodoRepository;
use composable_todo_core::pagination::PageRequest;
use composable_todo_core::service::TodoService;
use composable_todo_core::todo::{Todo, TodoId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A request the client made, as recorded by [`FakeTodoApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET` with `page` and `pageSize`
    List {
        /// Requested page
        page: u32,
        /// Requested page size
        page_size: u32,
    },
    /// `POST` with a title
    Create {
        /// Title exactly as sent
        title: String,
    },
    /// `PUT` with id and flag
    Update {
        /// Target todo
        id: TodoId,
        /// Flag sent
        completed: bool,
    },
    /// `DELETE` by id
    Delete {
        /// Target todo
        id: TodoId,
    },
}

/// [`TodoApi`] served by a real [`TodoService`] without HTTP
///
/// Answers exactly like the server would (same validation, same errors)
/// and records every call. [`FakeTodoApi::set_failing`] makes every
/// following call fail with a 500.
#[derive(Clone)]
pub struct FakeTodoApi {
    service: TodoService,
    repository: InMemoryTodoRepository,
    failing: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl FakeTodoApi {
    /// Fake backed by an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::over(InMemoryTodoRepository::new())
    }

    /// Fake backed by the two startup records, timestamped with [`test_clock`]
    #[must_use]
    pub fn seeded() -> Self {
        Self::over(InMemoryTodoRepository::with_seed_data(&test_clock()))
    }

    fn over(repository: InMemoryTodoRepository) -> Self {
        Self {
            service: TodoService::new(Arc::new(repository.clone()), Arc::new(test_clock())),
            repository,
            failing: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The store behind the fake, for direct inspection
    #[must_use]
    pub const fn repository(&self) -> &InMemoryTodoRepository {
        &self.repository
    }

    /// Make every following call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every call received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "Server error".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FakeTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FakeTodoApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTodoApi")
            .field("failing", &self.failing.load(Ordering::SeqCst))
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

fn to_api_error(error: TodoError) -> ApiError {
    let status = match &error {
        TodoError::Validation(_) => 400,
        TodoError::NotFound(_) => 404,
        TodoError::Storage(_) => 500,
    };
    ApiError::Status {
        status,
        message: error.to_string(),
    }
}

impl TodoApi for FakeTodoApi {
    fn list_todos(&self, request: PageRequest) -> ApiFuture<'_, ListTodosResponse> {
        Box::pin(async move {
            self.record(ApiCall::List {
                page: request.page(),
                page_size: request.page_size(),
            })?;
            self.service.list(request).await.map_err(to_api_error)
        })
    }

    fn create_todo(&self, title: String) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.record(ApiCall::Create {
                title: title.clone(),
            })?;
            self.service
                .create(Some(&title))
                .await
                .map_err(to_api_error)
        })
    }

    fn update_todo(&self, id: TodoId, completed: bool) -> ApiFuture<'_, Todo> {
        Box::pin(async move {
            self.record(ApiCall::Update { id, completed })?;
            self.service
                .set_completed(Some(id), Some(completed))
                .await
                .map_err(to_api_error)
        })
    }

    fn delete_todo(&self, id: TodoId) -> ApiFuture<'_, MessageResponse> {
        Box::pin(async move {
            self.record(ApiCall::Delete { id })?;
            self.service
                .delete(Some(&id.to_string()))
                .await
                .map(|_| MessageResponse {
                    message: "Deleted successfully".to_string(),
                })
                .map_err(to_api_error)
        })
    }
}
