//! Terminal client for the todo server.
//!
//! Reads commands from stdin, sends them through the store, and prints the
//! screen after every command. Set `TODO_API_URL` to point at a server other
//! than `http://localhost:3000/api/todos`.

use composable_todo_client::command::HELP;
use composable_todo_client::{
    Command, CommandError, HttpTodoApi, TodoListAction, TodoListEnvironment, TodoListReducer,
    TodoListState, render,
};
use composable_todo_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type TodoStore = Store<TodoListState, TodoListAction, TodoListEnvironment, TodoListReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the screen
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "composable_todo_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api = HttpTodoApi::from_env()?;
    println!("Connected to {}\n{HELP}\n", api.base_url());

    let env = TodoListEnvironment::new(Arc::new(api));
    let store = Store::new(TodoListState::default(), TodoListReducer::new(), env);

    settle(&store, vec![TodoListAction::Appeared]).await?;
    print_screen(&store).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{HELP}");
                continue;
            },
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        let actions = store.state(|state| command.actions(state)).await;
        match actions {
            Ok(actions) => {
                settle(&store, actions).await?;
                print_screen(&store).await;
            },
            Err(error) => println!("{error}"),
        }
    }

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

/// Send actions in order, waiting for each one's requests to finish
async fn settle(store: &TodoStore, actions: Vec<TodoListAction>) -> Result<(), StoreError> {
    for action in actions {
        let mut handle = store.send(action).await?;
        handle.wait().await;
    }
    Ok(())
}

async fn print_screen(store: &TodoStore) {
    let view = store.state(render).await;
    println!("{view}");
}
