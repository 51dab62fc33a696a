//! View state and actions for the todo list screen.

use composable_todo_core::pagination::Pagination;
use composable_todo_core::todo::{Todo, TodoId};

/// Everything the todo list screen shows
///
/// Mirrors one page of the server's collection plus the local input state.
/// The screen starts out loading page 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoListState {
    /// Todos on the current page, most recent first
    pub todos: Vec<Todo>,
    /// Text typed into the new-todo input
    pub draft: String,
    /// A page request is in flight
    pub loading: bool,
    /// A create request is in flight
    pub submitting: bool,
    /// User-visible message for the last failed request
    pub error: Option<String>,
    /// 1-based page being shown
    pub current_page: u32,
    /// Pages in the server's collection
    pub total_pages: u64,
}

impl Default for TodoListState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            draft: String::new(),
            loading: true,
            submitting: false,
            error: None,
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl TodoListState {
    /// Whether `Submit` would send a create request right now
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.draft.trim().is_empty()
    }

    /// Looks up a todo on the current page
    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }
}

/// Actions for the todo list screen
///
/// User intents come first; the rest are results produced by effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoListAction {
    // ========== User intents ==========
    /// The screen was shown for the first time
    Appeared,

    /// A page button was pressed
    LoadPage {
        /// 1-based page to show
        page: u32,
    },

    /// The new-todo input changed
    DraftChanged {
        /// Full input text
        text: String,
    },

    /// The add form was submitted
    Submit,

    /// A checkbox was clicked
    ToggleCompletion {
        /// Todo whose checkbox was clicked
        id: TodoId,
        /// Completion flag as currently shown
        completed: bool,
    },

    /// A delete button was pressed
    Delete {
        /// Todo to delete
        id: TodoId,
    },

    // ========== Results ==========
    /// The server returned a page
    PageLoaded {
        /// Page that was requested
        page: u32,
        /// Todos on that page
        todos: Vec<Todo>,
        /// Collection metadata
        pagination: Pagination,
    },

    /// The page request failed
    LoadFailed {
        /// Why, for the log
        reason: String,
    },

    /// The server created a todo
    TodoCreated {
        /// Record as stored by the server
        todo: Todo,
    },

    /// The create request failed
    CreateFailed {
        /// Why, for the log
        reason: String,
    },

    /// The server updated a todo
    TodoUpdated {
        /// Record as stored by the server
        todo: Todo,
    },

    /// The update request failed
    UpdateFailed {
        /// Why, for the log
        reason: String,
    },

    /// The server deleted a todo
    TodoDeleted {
        /// Todo that is gone
        id: TodoId,
    },

    /// The delete request failed
    DeleteFailed {
        /// Why, for the log
        reason: String,
    },
}
