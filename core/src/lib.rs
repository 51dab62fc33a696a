//! # Composable Todo Core
//!
//! Core traits and types for the Composable Todo application.
//!
//! This crate holds everything that both sides of the application share:
//!
//! - **Reducer / Effect / Environment**: the abstractions the client
//!   controller is written against (executed by `composable-todo-runtime`)
//! - **Todo model**: [`todo::Todo`] and its strongly-typed parts
//! - **Pagination**: [`pagination::PageRequest`] and [`pagination::Pagination`]
//! - **Storage**: the [`repository::TodoRepository`] trait and the default
//!   [`memory::InMemoryTodoRepository`]
//! - **Service**: [`service::TodoService`], validation plus storage calls,
//!   used by the HTTP handler
//! - **API contract**: the JSON bodies exchanged over HTTP and the client-side
//!   [`api::TodoApi`] port
//!
//! ## Example
//!
//! ```
//! use composable_todo_core::environment::SystemClock;
//! use composable_todo_core::memory::InMemoryTodoRepository;
//! use composable_todo_core::pagination::PageRequest;
//! use composable_todo_core::service::TodoService;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TodoService::new(
//!     Arc::new(InMemoryTodoRepository::with_seed_data(&SystemClock)),
//!     Arc::new(SystemClock),
//! );
//!
//! let created = service.create(Some("  Buy milk  ")).await?;
//! assert_eq!(created.title.as_str(), "Buy milk");
//!
//! let page = service.list(PageRequest::default()).await?;
//! assert_eq!(page.data[0].id, created.id);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod api;
pub mod effect_macros;
pub mod error;
pub mod memory;
pub mod pagination;
pub mod repository;
pub mod service;
pub mod todo;

/// Reducer module - The core trait for UI and domain logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TodoListReducer {
    ///     type State = TodoListState;
    ///     type Action = TodoListAction;
    ///     type Environment = TodoListEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TodoListState,
    ///         action: TodoListAction,
    ///         env: &TodoListEnvironment,
    ///     ) -> SmallVec<[Effect<TodoListAction>; 4]> {
    ///         match action {
    ///             TodoListAction::LoadPage { page } => {
    ///                 state.loading = true;
    ///                 smallvec![fetch_page(env, page)]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The `Store` in
/// `composable-todo-runtime` executes them and feeds any produced action
/// back into the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Dispatch an action after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) => effects.iter().all(Effect::is_none),
                Effect::Delay { .. } | Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Timestamps on todos (`createdAt`, `updatedAt`) are always taken from
    /// an injected clock, so tests can pin them with a fixed clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
