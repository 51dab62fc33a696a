//! Storage abstraction for todo records.
//!
//! [`TodoRepository`] is the narrow interface the service talks to. Two
//! implementations exist:
//!
//! - [`crate::memory::InMemoryTodoRepository`]: the default, process-local store
//! - `PostgresTodoRepository` (in `composable-todo-postgres`): an sqlx pool
//!
//! Methods return boxed futures so the trait stays dyn-compatible and the
//! service can hold an `Arc<dyn TodoRepository>`.

use crate::pagination::{Page, PageRequest};
use crate::todo::{CompletionUpdate, NewTodo, Todo, TodoId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The database rejected or failed a query.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a [`Todo`].
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Boxed future returned by every [`TodoRepository`] method.
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Storage for todo records.
///
/// # Contract
///
/// - Ids are assigned by the store, increase monotonically, and are never reused.
/// - `list` returns records most recent first (insertion at the head).
/// - `update` only touches `completed` and `updated_at`.
/// - Each call is atomic with respect to other calls on the same store.
pub trait TodoRepository: Send + Sync {
    /// Fetch one todo by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend fails.
    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>>;

    /// Fetch one page of todos plus pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend fails.
    fn list(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Todo>>;

    /// Store a new todo at the head of the collection and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend fails.
    fn insert(&self, new_todo: NewTodo) -> RepositoryFuture<'_, Todo>;

    /// Apply a completion update. Returns `None` if no todo has `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend fails.
    fn update(&self, id: TodoId, update: CompletionUpdate) -> RepositoryFuture<'_, Option<Todo>>;

    /// Remove a todo. Returns `false` if no todo has `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend fails.
    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, bool>;
}
