//! Integration tests for the todo list screen with the Store
//!
//! The first group drives the reducer through the runtime against
//! `FakeTodoApi`. The second group runs the real server on a local port and
//! talks to it with `HttpTodoApi`.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use composable_todo_client::reducer::{CREATE_FAILED, LOAD_FAILED};
use composable_todo_client::render::ListBody;
use composable_todo_client::{
    HttpTodoApi, PAGE_SIZE, TodoListAction, TodoListEnvironment, TodoListReducer, TodoListState,
    render,
};
use composable_todo_core::api::{ApiError, TodoApi};
use composable_todo_core::memory::InMemoryTodoRepository;
use composable_todo_core::pagination::PageRequest;
use composable_todo_core::service::TodoService;
use composable_todo_core::todo::TodoId;
use composable_todo_runtime::Store;
use composable_todo_testing::{ApiCall, FakeTodoApi, test_clock};
use composable_todo_web::{AppState, build_router};
use std::sync::Arc;
use std::time::Duration;

type TodoStore = Store<TodoListState, TodoListAction, TodoListEnvironment, TodoListReducer>;

fn store_over(api: Arc<dyn TodoApi>) -> TodoStore {
    Store::new(
        TodoListState::default(),
        TodoListReducer::new(),
        TodoListEnvironment::new(api),
    )
}

async fn settle(store: &TodoStore, action: TodoListAction) {
    let mut handle = store.send(action).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .expect("effects did not settle");
}

#[tokio::test]
async fn screen_follows_the_server_through_a_session() {
    let api = Arc::new(FakeTodoApi::seeded());
    let store = store_over(api.clone());

    settle(&store, TodoListAction::Appeared).await;
    let state = store.state(Clone::clone).await;
    assert!(!state.loading);
    assert_eq!(state.todos.len(), 2);
    assert_eq!(state.total_pages, 1);

    settle(
        &store,
        TodoListAction::DraftChanged {
            text: " Buy milk ".to_string(),
        },
    )
    .await;
    settle(&store, TodoListAction::Submit).await;
    let state = store.state(Clone::clone).await;
    assert_eq!(state.todos[0].title.as_str(), "Buy milk");
    assert!(state.draft.is_empty());
    assert!(!state.submitting);

    let id = state.todos[0].id;
    settle(
        &store,
        TodoListAction::ToggleCompletion {
            id,
            completed: false,
        },
    )
    .await;
    assert!(store.state(|s| s.todo(id).unwrap().completed).await);

    settle(&store, TodoListAction::Delete { id }).await;
    assert!(store.state(|s| s.todo(id).is_none()).await);
    assert_eq!(api.repository().len().await, 2);

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::List {
                page: 1,
                page_size: PAGE_SIZE
            },
            ApiCall::Create {
                title: "Buy milk".to_string()
            },
            ApiCall::Update {
                id,
                completed: true
            },
            ApiCall::Delete { id },
        ]
    );

    store.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn failures_surface_as_messages() {
    let api = Arc::new(FakeTodoApi::seeded());
    let store = store_over(api.clone());
    api.set_failing(true);

    settle(&store, TodoListAction::Appeared).await;
    let view = store.state(render).await;
    assert_eq!(view.error.as_deref(), Some(LOAD_FAILED));
    assert_eq!(view.body, ListBody::Empty);

    settle(
        &store,
        TodoListAction::DraftChanged {
            text: "Buy milk".to_string(),
        },
    )
    .await;
    settle(&store, TodoListAction::Submit).await;
    let state = store.state(Clone::clone).await;
    assert_eq!(state.error.as_deref(), Some(CREATE_FAILED));
    assert_eq!(state.draft, "Buy milk");
    assert!(!state.submitting);

    api.set_failing(false);
    settle(&store, TodoListAction::LoadPage { page: 1 }).await;
    let state = store.state(Clone::clone).await;
    assert!(state.error.is_none());
    assert_eq!(state.todos.len(), 2);
}

#[tokio::test]
async fn page_buttons_appear_with_more_than_ten_todos() {
    let api = Arc::new(FakeTodoApi::seeded());
    for n in 0..9 {
        api.create_todo(format!("Task {n}")).await.unwrap();
    }
    let store = store_over(api.clone());

    settle(&store, TodoListAction::Appeared).await;
    let view = store.state(render).await;
    assert_eq!(view.pages.len(), 2);
    assert!(view.pages[0].current);

    settle(&store, TodoListAction::LoadPage { page: 2 }).await;
    let state = store.state(Clone::clone).await;
    assert_eq!(state.current_page, 2);
    assert_eq!(state.todos.len(), 1);
    assert_eq!(state.todos[0].title.as_str(), "Write a blog post");
}

/// Serve the real router on an ephemeral port and return the resource URL
async fn spawn_server() -> String {
    let clock = test_clock();
    let service = TodoService::new(
        Arc::new(InMemoryTodoRepository::with_seed_data(&clock)),
        Arc::new(clock),
    );
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}/api/todos")
}

#[tokio::test]
async fn http_api_speaks_the_server_contract() {
    let api = HttpTodoApi::new(&spawn_server().await).unwrap();

    let page = api.list_todos(PageRequest::default()).await.unwrap();
    assert_eq!(page.pagination.total, 2);

    let created = api.create_todo("  Buy milk ".to_string()).await.unwrap();
    assert_eq!(created.id, TodoId::new(3));
    assert_eq!(created.title.as_str(), "Buy milk");

    let updated = api.update_todo(created.id, true).await.unwrap();
    assert!(updated.completed);
    assert!(updated.updated_at.is_some());

    let message = api.delete_todo(created.id).await.unwrap();
    assert_eq!(message.message, "Deleted successfully");

    let page = api.list_todos(PageRequest::new(1, 1)).await.unwrap();
    assert_eq!(page.pagination.total, 2);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.data.len(), 1);
}

#[tokio::test]
async fn http_api_reports_status_and_server_message() {
    let api = HttpTodoApi::new(&spawn_server().await).unwrap();

    assert_eq!(
        api.update_todo(TodoId::new(99), true).await.unwrap_err(),
        ApiError::Status {
            status: 404,
            message: "Todo not found".to_string()
        }
    );
    assert_eq!(
        api.create_todo("   ".to_string()).await.unwrap_err(),
        ApiError::Status {
            status: 400,
            message: "Title cannot be empty".to_string()
        }
    );
}

#[tokio::test]
async fn store_runs_against_real_server() {
    let api = HttpTodoApi::new(&spawn_server().await).unwrap();
    let store = store_over(Arc::new(api));

    settle(&store, TodoListAction::Appeared).await;
    settle(
        &store,
        TodoListAction::ToggleCompletion {
            id: TodoId::new(2),
            completed: true,
        },
    )
    .await;

    let state = store.state(Clone::clone).await;
    assert!(state.error.is_none());
    assert!(!state.todo(TodoId::new(2)).unwrap().completed);
}
