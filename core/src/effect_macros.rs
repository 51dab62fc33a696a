//! Declarative macro for building `Effect::Future` values.

/// Create an `Effect::Future` from an async block
///
/// The block must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use composable_todo_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     match api.delete_todo(id).await {
///         Ok(_) => Some(TodoListAction::TodoDeleted { id }),
///         Err(error) => Some(TodoListAction::DeleteFailed { reason: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug)]
    enum TestAction {
        Loaded { count: usize },
    }

    #[test]
    fn async_effect_builds_future() {
        let effect = async_effect! {
            Some(TestAction::Loaded { count: 2 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }
}
