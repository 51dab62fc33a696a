//! Todo operations with input validation.
//!
//! [`TodoService`] is what the HTTP handler calls. It takes loosely-typed
//! request input (optional fields, raw query text), validates it, stamps
//! timestamps from the injected [`Clock`], and delegates to a
//! [`TodoRepository`].

use crate::environment::Clock;
use crate::error::TodoError;
use crate::pagination::{Page, PageRequest};
use crate::repository::TodoRepository;
use crate::todo::{CompletionUpdate, NewTodo, Todo, TodoId, TodoTitle};
use std::sync::Arc;

/// Validating front for a [`TodoRepository`]
#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    /// Creates a service over the given storage and clock
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Returns one page of todos, most recent first
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Storage`] if the repository fails.
    pub async fn list(&self, request: PageRequest) -> Result<Page<Todo>, TodoError> {
        let page = self.repository.list(request).await?;
        tracing::debug!(
            page = request.page(),
            page_size = request.page_size(),
            returned = page.data.len(),
            total = page.pagination.total,
            "Listed todos"
        );
        Ok(page)
    }

    /// Creates a todo from a raw title
    ///
    /// The title is trimmed before it is stored.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Validation`] if the title is missing or blank
    /// - [`TodoError::Storage`] if the repository fails
    pub async fn create(&self, title: Option<&str>) -> Result<Todo, TodoError> {
        let title = TodoTitle::parse(title.unwrap_or_default())?;
        let todo = self
            .repository
            .insert(NewTodo {
                title,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// Sets the completion flag of an existing todo
    ///
    /// # Errors
    ///
    /// - [`TodoError::Validation`] ("Invalid parameters") if either field is missing
    /// - [`TodoError::NotFound`] if no todo has the id
    /// - [`TodoError::Storage`] if the repository fails
    pub async fn set_completed(
        &self,
        id: Option<TodoId>,
        completed: Option<bool>,
    ) -> Result<Todo, TodoError> {
        let (Some(id), Some(completed)) = (id, completed) else {
            return Err(TodoError::validation("Invalid parameters"));
        };

        let update = CompletionUpdate {
            completed,
            updated_at: self.clock.now(),
        };

        match self.repository.update(id, update).await? {
            Some(todo) => {
                tracing::info!(todo_id = %id, completed, "Todo completion updated");
                Ok(todo)
            },
            None => {
                tracing::debug!(todo_id = %id, "Update for unknown todo");
                Err(TodoError::NotFound(id))
            },
        }
    }

    /// Deletes a todo identified by raw query text
    ///
    /// Returns the id that was removed.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Validation`] ("Missing id parameter") if the id is
    ///   missing, zero, or not a positive integer
    /// - [`TodoError::NotFound`] if no todo has the id
    /// - [`TodoError::Storage`] if the repository fails
    pub async fn delete(&self, raw_id: Option<&str>) -> Result<TodoId, TodoError> {
        let id = parse_id(raw_id)?;

        if self.repository.delete(id).await? {
            tracing::info!(todo_id = %id, "Todo deleted");
            Ok(id)
        } else {
            tracing::debug!(todo_id = %id, "Delete for unknown todo");
            Err(TodoError::NotFound(id))
        }
    }
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService").finish_non_exhaustive()
    }
}

fn parse_id(raw: Option<&str>) -> Result<TodoId, TodoError> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(TodoId::new)
        .ok_or_else(|| TodoError::validation("Missing id parameter"))
}
