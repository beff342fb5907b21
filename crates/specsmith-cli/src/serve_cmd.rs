use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use specsmith_core::error::ApiError;
use specsmith_core::llm::ModelClient;
use specsmith_core::spec::{self, CreateSpecRequest};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared handler state: the connection pool and the model client.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<dyn ModelClient>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Boundary error: every pipeline failure renders as a uniform
/// `{message, statusCode}` envelope.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "message": self.message,
            "statusCode": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Success envelope wrapping every 2xx payload.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: &'static str,
    #[serde(rename = "responseTimeMs")]
    pub response_time_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentStatus {
    fn healthy(started: Instant) -> Self {
        Self {
            status: "healthy",
            response_time_ms: started.elapsed().as_millis(),
            error: None,
        }
    }

    fn unhealthy(started: Instant, error: String) -> Self {
        Self {
            status: "unhealthy",
            response_time_ms: started.elapsed().as_millis(),
            error: Some(error),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub server: ComponentStatus,
    pub database: ComponentStatus,
    pub llm: ComponentStatus,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/tasks", post(create_task))
        .route("/api/v1/getTasks", get(get_tasks))
        .route("/api/v1/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(
    pool: PgPool,
    model: Arc<dyn ModelClient>,
    bind: &str,
    port: u16,
) -> Result<()> {
    let app = build_router(AppState { pool, model });
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("specsmith serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("specsmith serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateSpecRequest>,
) -> Result<axum::response::Response, AppError> {
    let data = spec::create_spec(&state.pool, state.model.as_ref(), &req).await?;

    let envelope = Envelope {
        message: "Task created successfully".to_string(),
        status_code: StatusCode::CREATED.as_u16(),
        data,
    };
    Ok((StatusCode::CREATED, Json(envelope)).into_response())
}

async fn get_tasks(
    State(state): State<AppState>,
) -> Result<axum::response::Response, AppError> {
    let data = spec::list_specs(&state.pool).await?;

    let envelope = Envelope {
        message: "Tasks fetched successfully".to_string(),
        status_code: StatusCode::OK.as_u16(),
        data,
    };
    Ok(Json(envelope).into_response())
}

/// Ping the database and the model endpoint and report per-component
/// status. 200 when everything is healthy, 503 otherwise.
async fn health(State(state): State<AppState>) -> axum::response::Response {
    let started = Instant::now();
    let server = ComponentStatus::healthy(started);

    let db_started = Instant::now();
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => ComponentStatus::healthy(db_started),
        Err(e) => ComponentStatus::unhealthy(db_started, e.to_string()),
    };

    let llm_started = Instant::now();
    let llm = match state.model.probe().await {
        Ok(()) => ComponentStatus::healthy(llm_started),
        Err(e) => ComponentStatus::unhealthy(llm_started, e.to_string()),
    };

    let all_healthy = server.is_healthy() && database.is_healthy() && llm.is_healthy();
    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let envelope = Envelope {
        message: if all_healthy {
            "All systems operational".to_string()
        } else {
            "Some systems are down".to_string()
        },
        status_code: status.as_u16(),
        data: HealthResponse {
            server,
            database,
            llm,
        },
    };

    (status, Json(envelope)).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
