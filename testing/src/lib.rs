//! # Composable Todo Testing
//!
//! Testing utilities for Composable Todo.
//!
//! This crate provides:
//! - [`FixedClock`] and [`test_clock`] for deterministic timestamps
//! - [`FakeTodoApi`], an in-process `TodoApi` with failure injection
//! - [`ReducerTest`], a Given/When/Then harness for reducers
//! - [`effects::resolve`] to run the effects a reducer returned
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_testing::{FakeTodoApi, ReducerTest, effects};
//!
//! let api = Arc::new(FakeTodoApi::seeded());
//! let returned = ReducerTest::new(TodoListReducer)
//!     .with_env(TodoListEnvironment::new(api.clone()))
//!     .given_state(TodoListState::default())
//!     .when_action(TodoListAction::Appeared)
//!     .then_state(|state| assert!(state.loading))
//!     .run();
//!
//! let actions = effects::resolve(returned).await;
//! assert!(matches!(actions[0], TodoListAction::PageLoaded { .. }));
//! ```

use chrono::{DateTime, Utc};
use composable_todo_core::environment::Clock;

mod fake_api;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    pub use crate::fake_api::{ApiCall, FakeTodoApi};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use composable_todo_testing::mocks::FixedClock;
    /// use composable_todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Running effects outside a store
pub mod effects {
    use composable_todo_core::effect::Effect;

    /// Execute effects in order and collect the actions they produce
    ///
    /// `Parallel` children run one after another, `Delay` yields its action
    /// without sleeping, and `None` produces nothing. Actions are not fed
    /// back into any reducer.
    pub async fn resolve<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut pending: Vec<Effect<A>> = effects.into_iter().collect();
        pending.reverse();

        let mut actions = Vec::new();
        while let Some(effect) = pending.pop() {
            match effect {
                Effect::None => {},
                Effect::Parallel(children) => pending.extend(children.into_iter().rev()),
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Future(fut) => actions.extend(fut.await),
            }
        }
        actions
    }
}

pub use fake_api::{ApiCall, FakeTodoApi};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;
    use composable_todo_core::async_effect;
    use composable_todo_core::effect::Effect;
    use std::time::Duration;

    #[test]
    fn test_clock_is_new_year_2025() {
        let clock = test_clock();
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(clock.now(), clock.now());
    }

    #[tokio::test]
    async fn resolve_flattens_in_order() {
        let effects = vec![
            async_effect! { Some(1) },
            Effect::None,
            Effect::merge(vec![
                Effect::Delay {
                    duration: Duration::from_secs(3600),
                    action: Box::new(2),
                },
                async_effect! { None },
                async_effect! { Some(3) },
            ]),
        ];

        assert_eq!(effects::resolve(effects).await, vec![1, 2, 3]);
    }
}
