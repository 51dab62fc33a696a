//! # Composable Todo Runtime
//!
//! The Store that runs a reducer and executes the effects it returns.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, calls the reducer, and executes effects
//! - **Effect Executor**: spawns effect work on tokio and feeds produced
//!   actions back into the reducer
//! - **`EffectHandle`**: lets a caller wait until an action and everything it
//!   caused has settled
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_runtime::Store;
//!
//! let store = Store::new(TodoListState::default(), TodoListReducer, environment);
//!
//! // Send an action and wait for the HTTP round trip it triggers
//! let mut handle = store.send(TodoListAction::Appeared).await?;
//! handle.wait().await;
//!
//! // Read state
//! let count = store.state(|s| s.todos.len()).await;
//! ```

use composable_todo_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. The handle covers the effects of the sent
/// action and, transitively, the effects of every action those effects feed
/// back into the store.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(TodoListAction::Submit).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The create request finished and its result action was reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: effect counter shared by one action and everything it causes
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: decrements the effect counter on drop, even if the effect panics
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements the store-wide pending counter on drop
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, DecrementGuard, Duration, Effect, EffectHandle,
        EffectTracking, Ordering, PendingGuard, Reducer, RwLock, StoreError,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (view logic)
    /// 3. Environment (injected dependencies such as the todo API)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning is cheap; clones share state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Starts the returned effects on tokio
        ///
        /// Returns once the effects are started, not finished. Use the returned
        /// [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await?;
            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let error = store.state(|s| s.error.clone()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Number of effects currently running across the whole store
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Stop accepting actions and wait for running effects to finish
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
        /// all pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        async fn dispatch(&self, action: A, tracking: &EffectTracking) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!(?action, "Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!(?action, "Processing action");
            metrics::counter!("store.actions.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, tracking);
            }

            Ok(())
        }

        /// Runs one effect. Work is spawned so the caller never waits on I/O.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.spawn_tracked(tracking, fut);
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!(?duration, "Executing Effect::Delay");
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    self.spawn_tracked(tracking, async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    });
                },
            }
        }

        fn spawn_tracked<F>(&self, tracking: &EffectTracking, fut: F)
        where
            F: std::future::Future<Output = Option<A>> + Send + 'static,
        {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = PendingGuard(Arc::clone(&self.pending_effects));

            let tracking = tracking.clone();
            let store = self.clone();

            tokio::spawn(async move {
                let _guard = DecrementGuard(tracking.clone());
                let _pending_guard = pending_guard;

                if let Some(action) = fut.await {
                    // Feedback runs under the same tracking, so the handle
                    // stays pending until the whole cascade settles.
                    if let Err(error) = Box::pin(store.dispatch(action, &tracking)).await {
                        tracing::warn!(%error, "Dropped action produced by effect");
                    }
                }
            });
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use composable_todo_core::{SmallVec, async_effect, smallvec};

    #[derive(Debug, Clone, Default)]
    struct TestState {
        value: i32,
        log: Vec<&'static str>,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        Fetch,
        Fetched(i32),
        DelayedIncrement,
        FanOut,
        Chain,
        Slow,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut TestState,
            action: TestAction,
            _env: &TestEnv,
        ) -> SmallVec<[Effect<TestAction>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Fetch => {
                    state.log.push("fetch");
                    smallvec![async_effect! { Some(TestAction::Fetched(41)) }]
                },
                TestAction::Fetched(value) => {
                    state.log.push("fetched");
                    state.value = value;
                    SmallVec::new()
                },
                TestAction::DelayedIncrement => smallvec![Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(TestAction::Increment),
                }],
                TestAction::FanOut => smallvec![Effect::merge(vec![
                    async_effect! { Some(TestAction::Increment) },
                    async_effect! { Some(TestAction::Increment) },
                    async_effect! { None },
                ])],
                TestAction::Chain => {
                    smallvec![async_effect! { Some(TestAction::Fetch) }]
                },
                TestAction::Slow => smallvec![async_effect! {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    None
                }],
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn send_updates_state() {
        let store = store();
        let handle = store.send(TestAction::Increment).await.unwrap();

        assert_eq!(handle.pending(), 0);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn future_feeds_action_back() {
        let store = store();
        let mut handle = store.send(TestAction::Fetch).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 41);
        assert_eq!(store.state(|s| s.log.clone()).await, vec!["fetch", "fetched"]);
    }

    #[tokio::test]
    async fn delay_dispatches_after_sleeping() {
        let store = store();
        let mut handle = store.send(TestAction::DelayedIncrement).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 0);

        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn parallel_effects_all_run() {
        let store = store();
        let mut handle = store.send(TestAction::FanOut).await.unwrap();
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test]
    async fn handle_covers_cascading_effects() {
        let store = store();
        let mut handle = store.send(TestAction::Chain).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 41);
    }

    #[tokio::test]
    async fn completed_handle_does_not_block() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(50)).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store.send(TestAction::Increment).await;
        assert_eq!(result.unwrap_err(), StoreError::ShutdownInProgress);
    }

    #[tokio::test]
    async fn shutdown_times_out_on_slow_effects() {
        let store = store();
        let _handle = store.send(TestAction::Slow).await.unwrap();

        let result = store.shutdown(Duration::from_millis(20)).await;
        assert_eq!(result, Err(StoreError::ShutdownTimeout(1)));
    }
}
