//! In-process todo storage.
//!
//! The default backend for the server. State lives behind a single
//! `RwLock`, so id assignment and list mutation are atomic per call. Nothing
//! survives a restart.

use crate::environment::Clock;
use crate::pagination::{Page, PageRequest, Pagination};
use crate::repository::{RepositoryFuture, TodoRepository};
use crate::todo::{CompletionUpdate, NewTodo, Todo, TodoId, TodoTitle};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Titles and completion flags of the records a fresh server starts with,
/// in list order. They get ids 1 and 2.
pub const SEED: [(&str, bool); 2] = [("Learn Rust", false), ("Write a blog post", true)];

#[derive(Debug, Default)]
struct Inner {
    /// Most recent first
    todos: Vec<Todo>,
    /// Highest id ever handed out
    last_id: TodoId,
}

/// Todo repository held entirely in memory
///
/// Cloning is cheap and every clone shares the same records.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoRepository {
    /// Creates an empty repository; the first inserted todo gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the two startup records
    ///
    /// Id 1 is "Learn Rust" (open) and id 2 is "Write a blog post" (done).
    /// The first inserted todo gets id 3.
    #[must_use]
    pub fn with_seed_data(clock: &dyn Clock) -> Self {
        let now = clock.now();
        let mut last_id = TodoId::default();
        let mut todos = Vec::with_capacity(SEED.len());

        for (title, completed) in SEED {
            last_id = last_id.next();
            todos.push(Todo {
                id: last_id,
                title: TodoTitle::from_static(title),
                completed,
                created_at: now,
                updated_at: None,
            });
        }

        Self {
            inner: Arc::new(RwLock::new(Inner { todos, last_id })),
        }
    }

    /// Number of stored todos
    pub async fn len(&self) -> usize {
        self.inner.read().await.todos.len()
    }

    /// Whether the repository holds no todos
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.todos.is_empty()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner.todos.iter().find(|todo| todo.id == id).cloned())
        })
    }

    fn list(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Todo>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(Page {
                data: request.slice(&inner.todos).to_vec(),
                pagination: Pagination::new(request, inner.todos.len() as u64),
            })
        })
    }

    fn insert(&self, new_todo: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.last_id = inner.last_id.next();
            let todo = Todo::new(inner.last_id, new_todo);
            inner.todos.insert(0, todo.clone());
            Ok(todo)
        })
    }

    fn update(&self, id: TodoId, update: CompletionUpdate) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            Ok(inner.todos.iter_mut().find(|todo| todo.id == id).map(|todo| {
                todo.apply(update);
                todo.clone()
            }))
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, bool> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let before = inner.todos.len();
            inner.todos.retain(|todo| todo.id != id);
            Ok(inner.todos.len() < before)
        })
    }
}
