//! Application state for Axum handlers.

use crate::config::AppEnvironment;
use composable_todo_core::service::TodoService;
use std::time::Duration;

/// Application state shared across all HTTP handlers.
///
/// Holds the todo service (and through it the store), so nothing lives in
/// module-level globals. Cloning is cheap.
///
/// # Examples
///
/// ```ignore
/// let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()), Arc::new(SystemClock));
/// let state = AppState::new(service)
///     .with_latency(Duration::from_millis(200))
///     .with_environment(AppEnvironment::Development);
/// ```
#[derive(Clone, Debug)]
pub struct AppState {
    /// Validating front for the configured store
    pub service: TodoService,
    /// Delay applied before every todo request is handled
    pub latency: Duration,
    /// Controls error detail in 500 responses
    pub environment: AppEnvironment,
}

impl AppState {
    /// State with no artificial latency in production mode.
    #[must_use]
    pub const fn new(service: TodoService) -> Self {
        Self {
            service,
            latency: Duration::ZERO,
            environment: AppEnvironment::Production,
        }
    }

    /// Set the per-request latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Set the deployment mode.
    #[must_use]
    pub const fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_todo_core::environment::SystemClock;
    use composable_todo_core::memory::InMemoryTodoRepository;
    use std::sync::Arc;

    #[test]
    fn builders_override_defaults() {
        let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()), Arc::new(SystemClock));
        let state = AppState::new(service)
            .with_latency(Duration::from_millis(5))
            .with_environment(AppEnvironment::Development);

        assert_eq!(state.latency, Duration::from_millis(5));
        assert_eq!(state.environment, AppEnvironment::Development);
    }
}
