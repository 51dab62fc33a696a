//! `PostgreSQL` todo storage for Composable Todo.
//!
//! [`PostgresTodoRepository`] implements the `TodoRepository` trait from
//! `composable-todo-core` over an sqlx connection pool, so the server can
//! swap it in for the in-memory store without touching handler logic.
//!
//! # Example
//!
//! ```ignore
//! use composable_todo_postgres::{PoolConfig, PostgresTodoRepository};
//!
//! let repository = PostgresTodoRepository::connect(&PoolConfig::new(database_url)).await?;
//! repository.migrate().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use composable_todo_core::environment::Clock;
use composable_todo_core::memory::SEED;
use composable_todo_core::pagination::{Page, PageRequest, Pagination};
use composable_todo_core::repository::{RepositoryError, RepositoryFuture, TodoRepository};
use composable_todo_core::todo::{CompletionUpdate, NewTodo, Todo, TodoId, TodoTitle};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

const TODO_COLUMNS: &str = "id, title, completed, created_at, updated_at";

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// `postgres://` connection string
    pub database_url: String,
    /// Upper bound on open connections
    pub max_connections: u32,
    /// How long a caller waits for a free connection
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    /// Pool of 10 connections with a 30 second acquire timeout
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Todo repository backed by a `todos` table
#[derive(Clone, Debug)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool
    ///
    /// Idle connections are kept open; callers queue for a connection for
    /// at most `acquire_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the database is unreachable.
    pub async fn connect(config: &PoolConfig) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(None)
            .connect(&config.database_url)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self::from_pool(pool))
    }

    /// Create the `todos` table if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))
    }

    /// Insert the two startup records when the table is empty
    ///
    /// Returns whether anything was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if a query fails.
    pub async fn seed_if_empty(&self, clock: &dyn Clock) -> Result<bool, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;
        if count > 0 {
            return Ok(false);
        }

        let now = clock.now();
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Later rows list first, so the record meant to be on top goes in last
        for (index, &(title, completed)) in SEED.iter().enumerate().rev() {
            sqlx::query("INSERT INTO todos (id, title, completed, created_at) VALUES ($1, $2, $3, $4)")
                .bind(seed_id(index + 1))
                .bind(title)
                .bind(completed)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }
        sqlx::query("SELECT setval(pg_get_serial_sequence('todos', 'id'), $1)")
            .bind(seed_id(SEED.len()))
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        tracing::info!("Seeded todos table");
        Ok(true)
    }

    /// Get the underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_todo(row: &PgRow) -> Result<Todo, RepositoryError> {
        let id: i64 = row.try_get("id").map_err(database_error)?;
        let title: String = row.try_get("title").map_err(database_error)?;
        let completed: bool = row.try_get("completed").map_err(database_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(database_error)?;
        let updated_at: Option<DateTime<Utc>> =
            row.try_get("updated_at").map_err(database_error)?;

        let id = u64::try_from(id)
            .map_err(|_| RepositoryError::CorruptRecord(format!("negative todo id {id}")))?;
        let title = TodoTitle::parse(&title)
            .map_err(|e| RepositoryError::CorruptRecord(format!("todo {id}: {e}")))?;

        Ok(Todo {
            id: TodoId::new(id),
            title,
            completed,
            created_at,
            updated_at,
        })
    }
}

fn database_error(error: sqlx::Error) -> RepositoryError {
    metrics::counter!("todo.postgres.errors").increment(1);
    RepositoryError::Database(error.to_string())
}

fn seed_id(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

fn id_param(id: TodoId) -> i64 {
    // Ids beyond i64 cannot exist in a BIGSERIAL column
    i64::try_from(id.get()).unwrap_or(i64::MAX)
}

impl TodoRepository for PostgresTodoRepository {
    fn get(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id_param(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

            row.as_ref().map(Self::row_to_todo).transpose()
        })
    }

    fn list(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Todo>> {
        Box::pin(async move {
            let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
                .fetch_one(&self.pool)
                .await
                .map_err(database_error)?;

            let rows = sqlx::query(&format!(
                "SELECT {TODO_COLUMNS} FROM todos ORDER BY position DESC LIMIT $1 OFFSET $2"
            ))
            .bind(i64::from(request.page_size()))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

            let data = rows.iter().map(Self::row_to_todo).collect::<Result<Vec<_>, _>>()?;
            let total = u64::try_from(total).unwrap_or_default();

            Ok(Page {
                data,
                pagination: Pagination::new(request, total),
            })
        })
    }

    fn insert(&self, new_todo: NewTodo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                "INSERT INTO todos (title, completed, created_at) VALUES ($1, FALSE, $2) \
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(new_todo.title.as_str())
            .bind(new_todo.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

            Self::row_to_todo(&row)
        })
    }

    fn update(&self, id: TodoId, update: CompletionUpdate) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                "UPDATE todos SET completed = $1, updated_at = $2 WHERE id = $3 \
                 RETURNING {TODO_COLUMNS}"
            ))
            .bind(update.completed)
            .bind(update.updated_at)
            .bind(id_param(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

            row.as_ref().map(Self::row_to_todo).transpose()
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(id_param(id))
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        })
    }
}
