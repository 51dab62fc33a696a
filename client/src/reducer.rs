//! Reducer for the todo list screen.
//!
//! User intents turn into API calls wrapped in `Effect::Future`. Each call
//! resolves to a result action, and the reducer merges that result into
//! local state. Every success re-syncs from what the server returned.

use crate::types::{TodoListAction, TodoListState};
use composable_todo_core::api::TodoApi;
use composable_todo_core::pagination::PageRequest;
use composable_todo_core::todo::TodoId;
use composable_todo_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;

/// Page size the screen always requests
pub const PAGE_SIZE: u32 = 10;

/// Shown when a page request fails
pub const LOAD_FAILED: &str = "Failed to load todos";
/// Shown when a create request fails
pub const CREATE_FAILED: &str = "Failed to add todo";
/// Shown when an update request fails
pub const UPDATE_FAILED: &str = "Failed to update todo";
/// Shown when a delete request fails
pub const DELETE_FAILED: &str = "Failed to delete todo";

/// Environment dependencies for the todo list reducer
#[derive(Clone)]
pub struct TodoListEnvironment {
    /// Where todos live
    pub api: Arc<dyn TodoApi>,
}

impl TodoListEnvironment {
    /// Creates a new `TodoListEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for TodoListEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoListEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list screen
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoListReducer;

impl TodoListReducer {
    /// Creates a new `TodoListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(
        state: &mut TodoListState,
        env: &TodoListEnvironment,
        page: u32,
    ) -> Effect<TodoListAction> {
        let request = PageRequest::new(page, PAGE_SIZE);
        state.loading = true;
        state.error = None;

        let api = Arc::clone(&env.api);
        async_effect! {
            match api.list_todos(request).await {
                Ok(response) => Some(TodoListAction::PageLoaded {
                    page: request.page(),
                    todos: response.data,
                    pagination: response.pagination,
                }),
                Err(error) => Some(TodoListAction::LoadFailed {
                    reason: error.to_string(),
                }),
            }
        }
    }

    fn submit(state: &mut TodoListState, env: &TodoListEnvironment) -> Option<Effect<TodoListAction>> {
        if !state.can_submit() {
            return None;
        }
        state.submitting = true;
        state.error = None;

        let title = state.draft.trim().to_string();
        let api = Arc::clone(&env.api);
        Some(async_effect! {
            match api.create_todo(title).await {
                Ok(todo) => Some(TodoListAction::TodoCreated { todo }),
                Err(error) => Some(TodoListAction::CreateFailed {
                    reason: error.to_string(),
                }),
            }
        })
    }

    fn toggle(
        state: &mut TodoListState,
        env: &TodoListEnvironment,
        id: TodoId,
        completed: bool,
    ) -> Effect<TodoListAction> {
        state.error = None;

        let api = Arc::clone(&env.api);
        async_effect! {
            match api.update_todo(id, !completed).await {
                Ok(todo) => Some(TodoListAction::TodoUpdated { todo }),
                Err(error) => Some(TodoListAction::UpdateFailed {
                    reason: error.to_string(),
                }),
            }
        }
    }

    fn delete(
        state: &mut TodoListState,
        env: &TodoListEnvironment,
        id: TodoId,
    ) -> Effect<TodoListAction> {
        state.error = None;

        let api = Arc::clone(&env.api);
        async_effect! {
            match api.delete_todo(id).await {
                Ok(_) => Some(TodoListAction::TodoDeleted { id }),
                Err(error) => Some(TodoListAction::DeleteFailed {
                    reason: error.to_string(),
                }),
            }
        }
    }

    fn fail(state: &mut TodoListState, message: &str, reason: &str) {
        tracing::warn!(%reason, "{message}");
        state.error = Some(message.to_string());
    }
}

impl Reducer for TodoListReducer {
    type State = TodoListState;
    type Action = TodoListAction;
    type Environment = TodoListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== User intents ==========
            TodoListAction::Appeared => smallvec![Self::load(state, env, 1)],

            TodoListAction::LoadPage { page } => smallvec![Self::load(state, env, page)],

            TodoListAction::DraftChanged { text } => {
                state.draft = text;
                SmallVec::new()
            },

            TodoListAction::Submit => Self::submit(state, env).into_iter().collect(),

            TodoListAction::ToggleCompletion { id, completed } => {
                smallvec![Self::toggle(state, env, id, completed)]
            },

            TodoListAction::Delete { id } => smallvec![Self::delete(state, env, id)],

            // ========== Results ==========
            TodoListAction::PageLoaded {
                page,
                todos,
                pagination,
            } => {
                state.todos = todos;
                state.current_page = page;
                state.total_pages = pagination.total_pages;
                state.loading = false;
                SmallVec::new()
            },

            TodoListAction::LoadFailed { reason } => {
                Self::fail(state, LOAD_FAILED, &reason);
                state.loading = false;
                SmallVec::new()
            },

            TodoListAction::TodoCreated { todo } => {
                tracing::debug!(todo_id = %todo.id, "Todo added");
                state.todos.insert(0, todo);
                state.draft.clear();
                state.submitting = false;
                SmallVec::new()
            },

            TodoListAction::CreateFailed { reason } => {
                Self::fail(state, CREATE_FAILED, &reason);
                state.submitting = false;
                SmallVec::new()
            },

            TodoListAction::TodoUpdated { todo } => {
                if let Some(local) = state.todos.iter_mut().find(|t| t.id == todo.id) {
                    *local = todo;
                }
                SmallVec::new()
            },

            TodoListAction::UpdateFailed { reason } => {
                Self::fail(state, UPDATE_FAILED, &reason);
                SmallVec::new()
            },

            TodoListAction::TodoDeleted { id } => {
                state.todos.retain(|todo| todo.id != id);
                SmallVec::new()
            },

            TodoListAction::DeleteFailed { reason } => {
                Self::fail(state, DELETE_FAILED, &reason);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_todo_core::pagination::Pagination;
    use composable_todo_testing::{ApiCall, FakeTodoApi, ReducerTest, assertions, effects};

    fn env(api: &Arc<FakeTodoApi>) -> TodoListEnvironment {
        TodoListEnvironment::new(Arc::clone(api) as Arc<dyn TodoApi>)
    }

    /// State after the first page of the seeded fake has been shown
    async fn loaded(api: &Arc<FakeTodoApi>) -> TodoListState {
        let page = api.list_todos(PageRequest::new(1, PAGE_SIZE)).await.unwrap();
        TodoListState {
            todos: page.data,
            loading: false,
            total_pages: page.pagination.total_pages,
            ..TodoListState::default()
        }
    }

    #[tokio::test]
    async fn appeared_loads_first_page() {
        let api = Arc::new(FakeTodoApi::seeded());

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState {
                error: Some(LOAD_FAILED.to_string()),
                ..TodoListState::default()
            })
            .when_action(TodoListAction::Appeared)
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.error.is_none());
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .then_effects(assertions::assert_has_future_effect)
            .run();

        let actions = effects::resolve(returned).await;
        assert_eq!(
            api.calls(),
            vec![ApiCall::List {
                page: 1,
                page_size: PAGE_SIZE
            }]
        );
        assert!(matches!(
            &actions[..],
            [TodoListAction::PageLoaded { page: 1, todos, .. }] if todos.len() == 2
        ));
    }

    #[test]
    fn page_loaded_replaces_todos_and_pagination() {
        let api = Arc::new(FakeTodoApi::new());

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState::default())
            .when_action(TodoListAction::PageLoaded {
                page: 3,
                todos: Vec::new(),
                pagination: Pagination {
                    total: 25,
                    page: 3,
                    page_size: 10,
                    total_pages: 3,
                },
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.todos.is_empty());
                assert_eq!(state.current_page, 3);
                assert_eq!(state.total_pages, 3);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn failed_load_sets_error_and_stops_loading() {
        let api = Arc::new(FakeTodoApi::seeded());
        api.set_failing(true);

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState::default())
            .when_action(TodoListAction::LoadPage { page: 2 })
            .run();
        let actions = effects::resolve(returned).await;
        assert!(matches!(actions[..], [TodoListAction::LoadFailed { .. }]));

        let action = actions.into_iter().next().unwrap();
        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState::default())
            .when_action(action)
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error.as_deref(), Some(LOAD_FAILED));
                assert_eq!(state.current_page, 1);
            })
            .run();
    }

    #[test]
    fn blank_draft_submit_is_a_no_op() {
        let api = Arc::new(FakeTodoApi::seeded());

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState::default())
            .when_action(TodoListAction::DraftChanged {
                text: "   ".to_string(),
            })
            .when_action(TodoListAction::Submit)
            .then_state(|state| assert!(!state.submitting))
            .then_effects(assertions::assert_no_effects)
            .run();

        assert!(api.calls().is_empty());
    }

    #[test]
    fn submit_while_submitting_is_a_no_op() {
        let api = Arc::new(FakeTodoApi::seeded());

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState {
                draft: "Buy milk".to_string(),
                submitting: true,
                ..TodoListState::default()
            })
            .when_action(TodoListAction::Submit)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn submit_creates_trimmed_title_and_prepends() {
        let api = Arc::new(FakeTodoApi::seeded());
        let state = loaded(&api).await;

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state.clone())
            .when_action(TodoListAction::DraftChanged {
                text: "  Buy milk ".to_string(),
            })
            .when_action(TodoListAction::Submit)
            .then_state(|state| {
                assert!(state.submitting);
                assert!(state.error.is_none());
            })
            .run();

        let actions = effects::resolve(returned).await;
        assert_eq!(
            api.calls().last(),
            Some(&ApiCall::Create {
                title: "Buy milk".to_string()
            })
        );

        let mut test = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState {
                draft: "  Buy milk ".to_string(),
                submitting: true,
                ..state
            });
        for action in actions {
            test = test.when_action(action);
        }
        test.then_state(|state| {
            assert!(!state.submitting);
            assert!(state.draft.is_empty());
            assert_eq!(state.todos.len(), 3);
            assert_eq!(state.todos[0].title.as_str(), "Buy milk");
            assert_eq!(state.todos[0].id, TodoId::new(3));
        })
        .run();
    }

    #[test]
    fn failed_create_keeps_draft_and_clears_submitting() {
        let api = Arc::new(FakeTodoApi::new());

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState {
                draft: "Buy milk".to_string(),
                submitting: true,
                loading: false,
                ..TodoListState::default()
            })
            .when_action(TodoListAction::CreateFailed {
                reason: "HTTP 500: Server error".to_string(),
            })
            .then_state(|state| {
                assert!(!state.submitting);
                assert_eq!(state.draft, "Buy milk");
                assert_eq!(state.error.as_deref(), Some(CREATE_FAILED));
                assert!(state.todos.is_empty());
            })
            .run();
    }

    #[tokio::test]
    async fn toggle_sends_inverted_flag_and_adopts_server_record() {
        let api = Arc::new(FakeTodoApi::seeded());
        let state = loaded(&api).await;

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state.clone())
            .when_action(TodoListAction::ToggleCompletion {
                id: TodoId::new(1),
                completed: false,
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();

        let actions = effects::resolve(returned).await;
        assert_eq!(
            api.calls().last(),
            Some(&ApiCall::Update {
                id: TodoId::new(1),
                completed: true
            })
        );

        let action = actions.into_iter().next().unwrap();
        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state)
            .when_action(action)
            .then_state(|state| {
                let todo = state.todo(TodoId::new(1)).unwrap();
                assert!(todo.completed);
                assert!(todo.updated_at.is_some());
            })
            .run();
    }

    #[tokio::test]
    async fn failed_toggle_leaves_record_unchanged() {
        let api = Arc::new(FakeTodoApi::seeded());
        let state = loaded(&api).await;
        api.set_failing(true);

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state.clone())
            .when_action(TodoListAction::ToggleCompletion {
                id: TodoId::new(2),
                completed: true,
            })
            .run();
        let action = effects::resolve(returned).await.into_iter().next().unwrap();

        let before = state.clone();
        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state)
            .when_action(action)
            .then_state(move |state| {
                assert_eq!(state.todos, before.todos);
                assert_eq!(state.error.as_deref(), Some(UPDATE_FAILED));
            })
            .run();
    }

    #[tokio::test]
    async fn delete_removes_record_on_success() {
        let api = Arc::new(FakeTodoApi::seeded());
        let state = loaded(&api).await;

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state.clone())
            .when_action(TodoListAction::Delete { id: TodoId::new(2) })
            .run();
        let actions = effects::resolve(returned).await;
        assert_eq!(actions, vec![TodoListAction::TodoDeleted { id: TodoId::new(2) }]);

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(state)
            .when_action(TodoListAction::TodoDeleted { id: TodoId::new(2) })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert!(state.todo(TodoId::new(2)).is_none());
            })
            .run();
    }

    #[tokio::test]
    async fn delete_of_missing_todo_reports_error() {
        let api = Arc::new(FakeTodoApi::seeded());

        let returned = ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(loaded(&api).await)
            .when_action(TodoListAction::Delete { id: TodoId::new(99) })
            .run();
        let actions = effects::resolve(returned).await;
        assert!(matches!(actions[..], [TodoListAction::DeleteFailed { .. }]));

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(loaded(&api).await)
            .when_action(actions.into_iter().next().unwrap())
            .then_state(|state| {
                assert_eq!(state.error.as_deref(), Some(DELETE_FAILED));
                assert_eq!(state.todos.len(), 2);
            })
            .run();
    }

    #[test]
    fn new_intent_clears_previous_error() {
        let api = Arc::new(FakeTodoApi::seeded());

        ReducerTest::new(TodoListReducer::new())
            .with_env(env(&api))
            .given_state(TodoListState {
                error: Some(DELETE_FAILED.to_string()),
                ..TodoListState::default()
            })
            .when_action(TodoListAction::Delete { id: TodoId::new(1) })
            .then_state(|state| assert!(state.error.is_none()))
            .run();
    }
}
