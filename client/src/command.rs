//! Commands typed into the terminal client.

use crate::types::{TodoListAction, TodoListState};
use composable_todo_core::todo::TodoId;
use std::str::FromStr;
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  add <title>    add a todo
  toggle <id>    flip a todo's completion
  delete <id>    delete a todo
  page <n>       show page n
  refresh        reload the current page
  help           show this help
  quit           exit";

/// A parsed terminal command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `add <title>`
    Add(String),
    /// `toggle <id>`
    Toggle(TodoId),
    /// `delete <id>`
    Delete(TodoId),
    /// `page <n>`
    Page(u32),
    /// `refresh`
    Refresh,
    /// `help`
    Help,
    /// `quit` or `exit`
    Quit,
}

/// Why a line could not be turned into actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing was typed
    #[error("empty command")]
    Empty,

    /// The first word is not a command
    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),

    /// The argument is missing or malformed
    #[error("usage: {0}")]
    Usage(&'static str),

    /// `toggle` names a todo that is not on the current page
    #[error("todo #{0} is not on this page")]
    NotOnPage(TodoId),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" if !rest.is_empty() => Ok(Self::Add(rest.to_string())),
            "add" => Err(CommandError::Usage("add <title>")),
            "toggle" => id(rest)
                .map(Self::Toggle)
                .ok_or(CommandError::Usage("toggle <id>")),
            "delete" | "rm" => id(rest)
                .map(Self::Delete)
                .ok_or(CommandError::Usage("delete <id>")),
            "page" => rest
                .parse::<u32>()
                .ok()
                .filter(|page| *page > 0)
                .map(Self::Page)
                .ok_or(CommandError::Usage("page <n>")),
            "refresh" => Ok(Self::Refresh),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn id(raw: &str) -> Option<TodoId> {
    raw.trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .map(TodoId::new)
}

impl Command {
    /// The actions that carry out this command against `state`
    ///
    /// `Help` and `Quit` produce no actions.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotOnPage`] when toggling a todo the screen
    /// does not show, since its current flag is unknown.
    pub fn actions(self, state: &TodoListState) -> Result<Vec<TodoListAction>, CommandError> {
        Ok(match self {
            Self::Add(text) => vec![
                TodoListAction::DraftChanged { text },
                TodoListAction::Submit,
            ],
            Self::Toggle(id) => {
                let todo = state.todo(id).ok_or(CommandError::NotOnPage(id))?;
                vec![TodoListAction::ToggleCompletion {
                    id,
                    completed: todo.completed,
                }]
            },
            Self::Delete(id) => vec![TodoListAction::Delete { id }],
            Self::Page(page) => vec![TodoListAction::LoadPage { page }],
            Self::Refresh => vec![TodoListAction::LoadPage {
                page: state.current_page,
            }],
            Self::Help | Self::Quit => Vec::new(),
        })
    }
}
