//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth;
use super::error::ApiError;
use super::types::{AcceptedResponse, HealthResponse, RootResponse};
use crate::config::{Config, EnvCredentials};
use crate::deploy::FileDeployer;
use crate::generator::LlmCodeGenerator;
use crate::llm::HttpClientFactory;
use crate::runner::{BuildJob, SharedTaskRunner, SpawnRunner, TaskRunner};
use crate::task::{AcceptedTask, MemoryTaskStore, SharedTaskStore, Task, TaskStore};

const ROOT_MESSAGE: &str = "Student API Endpoint - Ready";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Accepted tasks (best-effort, in memory by default)
    pub store: SharedTaskStore,
    /// Where accepted tasks are handed off for building
    pub runner: SharedTaskRunner,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/health", get(health))
        .route("/api/receive-task", post(receive_task).fallback(fallback))
        .route("/receive-task", post(receive_task).fallback(fallback))
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let generator = Arc::new(LlmCodeGenerator::new(
        Arc::new(EnvCredentials),
        Arc::new(HttpClientFactory::new(config.models.clone())),
        config.models.clone(),
    ));
    let deployer = Arc::new(FileDeployer::new(config.output_dir.clone()));
    tracing::info!("Generated apps will be written to {}", deployer.root().display());

    let state = Arc::new(AppState {
        config: config.clone(),
        store: Arc::new(MemoryTaskStore::new()),
        runner: Arc::new(SpawnRunner::new(generator, deployer)),
    });

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM/SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    // In-flight builds are dropped with the runtime.
    tracing::info!("Shutdown signal received");
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// Any other GET gets the root message; other methods get 404.
async fn fallback(method: Method) -> Response {
    if method == Method::GET {
        root().await.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tasks_accepted: state.store.count().await,
    })
}

/// Validate, authenticate, acknowledge, then hand the task to the runner.
async fn receive_task(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;
    let fields = Task::check_required(&value)?;

    // A non-string secret is a mismatch, not a malformed field.
    let authorized = fields
        .get("secret")
        .and_then(Value::as_str)
        .is_some_and(|submitted| auth::verify_secret(submitted, &state.config.secret));
    if !authorized {
        tracing::warn!(
            "Rejected task {} Round {}: invalid secret",
            fields["task"],
            fields["round"]
        );
        return Err(ApiError::InvalidSecret);
    }

    let task = Task::from_value(value)?;
    let job = BuildJob::new(task);
    tracing::info!(
        job_id = %job.job_id,
        "Task received: {} Round {}",
        job.task.task,
        job.task.round
    );

    state
        .store
        .record(AcceptedTask::new(job.job_id, &job.task))
        .await
        .map_err(ApiError::Internal)?;

    let response = AcceptedResponse::new(job.task.task.clone(), job.task.round.clone());
    state.runner.submit(job);

    Ok(Json(response))
}
