//! Todo list client for Composable Todo.
//!
//! The screen logic is a reducer:
//!
//! - [`TodoListState`] holds one page of todos plus input and request flags
//! - [`TodoListAction`] covers user intents and the results of API calls
//! - [`TodoListReducer`] turns intents into `TodoApi` calls (as effects) and
//!   merges results back into state
//! - [`render`] produces the [`TodoListView`] shown to the user
//!
//! [`HttpTodoApi`] talks to the server; tests use `FakeTodoApi` instead.
//!
//! # Quick Start
//!
//! ```no_run
//! use composable_todo_client::{
//!     HttpTodoApi, TodoListAction, TodoListEnvironment, TodoListReducer, TodoListState, render,
//! };
//! use composable_todo_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoListEnvironment::new(Arc::new(HttpTodoApi::from_env()?));
//! let store = Store::new(TodoListState::default(), TodoListReducer::new(), env);
//!
//! let mut handle = store.send(TodoListAction::Appeared).await?;
//! handle.wait().await;
//!
//! let view = store.state(render).await;
//! println!("{view}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod command;
pub mod reducer;
pub mod render;
pub mod types;

// Re-export commonly used types
pub use api::{ClientError, HttpTodoApi};
pub use command::{Command, CommandError};
pub use reducer::{PAGE_SIZE, TodoListEnvironment, TodoListReducer};
pub use render::{TodoListView, render};
pub use types::{TodoListAction, TodoListState};
