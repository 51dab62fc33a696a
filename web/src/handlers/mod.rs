//! HTTP request handlers.

pub mod health;
pub mod todos;

pub use health::health_check;
pub use todos::todos;
