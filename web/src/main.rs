//! Todo HTTP server.
//!
//! Serves `/api/todos` from memory by default, or from `PostgreSQL` when
//! `TODO_STORAGE=postgres`.

use composable_todo_core::environment::{Clock, SystemClock};
use composable_todo_core::memory::InMemoryTodoRepository;
use composable_todo_core::repository::TodoRepository;
use composable_todo_core::service::TodoService;
use composable_todo_postgres::PostgresTodoRepository;
use composable_todo_web::{AppState, Config, StorageBackend, build_router};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "composable_todo_web=info,composable_todo_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting todo server");

    let config = Config::from_env()?;
    info!(
        address = %config.server.address(),
        storage = ?config.storage,
        environment = ?config.server.environment,
        latency_ms = config.server.latency.as_millis(),
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository: Arc<dyn TodoRepository> = match config.storage {
        StorageBackend::Memory => {
            Arc::new(InMemoryTodoRepository::with_seed_data(clock.as_ref()))
        },
        StorageBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let repository = PostgresTodoRepository::connect(&config.postgres).await?;
            repository.migrate().await?;
            repository.seed_if_empty(clock.as_ref()).await?;
            Arc::new(repository)
        },
    };

    let state = AppState::new(TodoService::new(repository, clock))
        .with_latency(config.server.latency)
        .with_environment(config.server.environment);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
