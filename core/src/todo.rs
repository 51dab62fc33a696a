//! Domain types for todo items.
//!
//! A todo list is an ordered collection of [`Todo`] records, most recent first.
//! Records are created with a [`NewTodo`], changed only through a
//! [`CompletionUpdate`], and removed by id.

use crate::error::TodoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a todo item
///
/// Ids are positive, assigned by the store in increasing order, and never
/// reused. On the wire an id is a bare JSON number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from a raw integer
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Title of a todo item
///
/// Always trimmed and never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoTitle(String);

impl TodoTitle {
    /// Trims surrounding whitespace and rejects titles that end up empty
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Validation`] if the title is empty or whitespace-only.
    pub fn parse(raw: &str) -> Result<Self, TodoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TodoError::validation("Title cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a compile-time title known to be trimmed and non-empty
    pub(crate) fn from_static(title: &'static str) -> Self {
        Self(title.to_string())
    }

    /// Borrow the title text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TodoTitle {
    type Error = TodoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TodoTitle> for String {
    fn from(title: TodoTitle) -> Self {
        title.0
    }
}

impl std::fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub title: TodoTitle,
    /// Whether the todo is done
    pub completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When `completed` last changed; absent until the first update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Builds the stored record for a freshly created todo
    #[must_use]
    pub fn new(id: TodoId, new_todo: NewTodo) -> Self {
        Self {
            id,
            title: new_todo.title,
            completed: false,
            created_at: new_todo.created_at,
            updated_at: None,
        }
    }

    /// Applies a completion update. No other field changes.
    pub fn apply(&mut self, update: CompletionUpdate) {
        self.completed = update.completed;
        self.updated_at = Some(update.updated_at);
    }
}

/// Everything storage needs to create a todo; the id is assigned by storage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    /// Validated title
    pub title: TodoTitle,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// The only mutation a stored todo supports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionUpdate {
    /// New completion flag
    pub completed: bool,
    /// When the change happened
    pub updated_at: DateTime<Utc>,
}
