//! Presentation of [`TodoListState`].
//!
//! [`render`] turns state into a [`TodoListView`] holding only what the
//! screen shows. The view implements `Display` as plain text for the
//! terminal client.

use crate::types::TodoListState;
use composable_todo_core::todo::TodoId;
use std::fmt;

/// Label of the submit button while idle
pub const SUBMIT_LABEL: &str = "Add";
/// Label of the submit button while a create request is in flight
pub const SUBMITTING_LABEL: &str = "Adding...";
/// Shown instead of the list when the page is empty
pub const EMPTY_MESSAGE: &str = "No todos yet";

/// The add-todo button
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitButton {
    /// [`SUBMIT_LABEL`] or [`SUBMITTING_LABEL`]
    pub label: &'static str,
    /// Whether pressing it would submit
    pub enabled: bool,
}

/// One todo in the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoRow {
    /// Target for toggle and delete
    pub id: TodoId,
    /// Title text
    pub title: String,
    /// Checkbox state
    pub checked: bool,
}

/// Main area of the screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListBody {
    /// A page request is in flight
    Spinner,
    /// Loaded, nothing to show
    Empty,
    /// Loaded todos
    Rows(Vec<TodoRow>),
}

/// A numbered page button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageButton {
    /// 1-based page number
    pub page: u64,
    /// Whether this is the page being shown
    pub current: bool,
}

/// Everything the todo list screen displays
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoListView {
    /// Error banner
    pub error: Option<String>,
    /// Text in the input
    pub draft: String,
    /// Submit button
    pub submit: SubmitButton,
    /// Spinner, empty message, or rows
    pub body: ListBody,
    /// Page buttons; empty unless there is more than one page
    pub pages: Vec<PageButton>,
}

/// Builds the view for `state`
#[must_use]
pub fn render(state: &TodoListState) -> TodoListView {
    let body = if state.loading {
        ListBody::Spinner
    } else if state.todos.is_empty() {
        ListBody::Empty
    } else {
        ListBody::Rows(
            state
                .todos
                .iter()
                .map(|todo| TodoRow {
                    id: todo.id,
                    title: todo.title.to_string(),
                    checked: todo.completed,
                })
                .collect(),
        )
    };

    let pages = if !state.loading && state.total_pages > 1 {
        (1..=state.total_pages)
            .map(|page| PageButton {
                page,
                current: page == u64::from(state.current_page),
            })
            .collect()
    } else {
        Vec::new()
    };

    TodoListView {
        error: state.error.clone(),
        draft: state.draft.clone(),
        submit: SubmitButton {
            label: if state.submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            enabled: state.can_submit(),
        },
        body,
        pages,
    }
}

impl fmt::Display for TodoListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Todo List")?;

        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }

        let disabled = if self.submit.enabled { "" } else { " (disabled)" };
        writeln!(f, "> {}  [{}]{disabled}", self.draft, self.submit.label)?;

        match &self.body {
            ListBody::Spinner => writeln!(f, "  Loading...")?,
            ListBody::Empty => writeln!(f, "  {EMPTY_MESSAGE}")?,
            ListBody::Rows(rows) => {
                for row in rows {
                    let mark = if row.checked { 'x' } else { ' ' };
                    writeln!(f, "  [{mark}] #{} {}", row.id, row.title)?;
                }
            },
        }

        if !self.pages.is_empty() {
            write!(f, "Pages:")?;
            for button in &self.pages {
                if button.current {
                    write!(f, " [{}]", button.page)?;
                } else {
                    write!(f, " {}", button.page)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
