//! HTTP/JSON surface of the session control API.
//!
//! | Route                   | Operation                                   |
//! |-------------------------|---------------------------------------------|
//! | `POST /submit`          | [`SessionController::submit`]               |
//! | `POST /control`         | [`SessionController::control`]              |
//! | `GET /logs`             | [`SessionController::query_logs`]           |
//! | `GET /registers`        | [`SessionController::query_registers`]      |
//! | `GET /memory`           | [`SessionController::query_memory`]         |
//! | `GET /execution-status` | [`SessionController::execution_status`]     |
//! | `GET /health`           | liveness probe                              |
//!
//! Every response carries permissive CORS headers because the web UI is
//! served from a different origin.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{ExecutionStatus, SessionController};
use crate::errors::NOT_RUNNING_MESSAGE;
use crate::models::memory::MemorySnapshot;
use crate::models::register::Register;
use crate::{AppError, Result};

type SharedController = Arc<SessionController>;

/// Body of `POST /submit`.
#[derive(Debug, Deserialize)]
struct SubmitRequest {
    code: String,
}

/// Body of `POST /control`. The command is kept loosely typed so that a
/// non-string value is reported as an invalid command rather than a
/// deserialisation failure.
#[derive(Debug, Deserialize)]
struct ControlRequest {
    #[serde(default)]
    command: Value,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct LogsResponse {
    logs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RegistersResponse {
    registers: Vec<Register>,
}

/// Error response: an HTTP status with an `{error}` JSON body.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, message) = match &err {
            AppError::InvalidCommand(_) => (StatusCode::BAD_REQUEST, "Invalid command".to_owned()),
            AppError::EngineNotRunning => {
                (StatusCode::BAD_REQUEST, NOT_RUNNING_MESSAGE.to_owned())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Handler for `GET /health`. Returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

async fn submit(
    State(controller): State<SharedController>,
    payload: std::result::Result<Json<SubmitRequest>, JsonRejection>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "submit body rejected");
        rejection
    })?;
    controller.submit(&request.code).await?;
    Ok(Json(MessageResponse {
        message: "Code saved & Simulator started!".to_owned(),
    }))
}

/// A body that is missing, not JSON, or lacks a JSON content type is
/// answered like an unknown command.
async fn control(
    State(controller): State<SharedController>,
    payload: std::result::Result<Json<ControlRequest>, JsonRejection>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let raw = match payload {
        Ok(Json(request)) => match request.command {
            Value::String(raw) => raw,
            other => other.to_string(),
        },
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "control body rejected");
            return Err(AppError::InvalidCommand(String::new()).into());
        }
    };
    let command = controller.control(&raw).await.map_err(|err| {
        warn!(command = %raw, %err, "control command rejected");
        err
    })?;
    Ok(Json(MessageResponse {
        message: format!("Sent command: {command}"),
    }))
}

async fn logs(State(controller): State<SharedController>) -> Json<LogsResponse> {
    Json(LogsResponse {
        logs: controller.query_logs(),
    })
}

async fn registers(State(controller): State<SharedController>) -> Json<RegistersResponse> {
    Json(RegistersResponse {
        registers: controller.query_registers(),
    })
}

async fn memory(State(controller): State<SharedController>) -> Json<MemorySnapshot> {
    Json(controller.query_memory())
}

async fn execution_status(State(controller): State<SharedController>) -> Json<ExecutionStatus> {
    Json(controller.execution_status())
}

/// Add CORS headers to every response and answer preflight requests.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

/// Build the API router around `controller`.
pub fn router(controller: SharedController) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .route("/control", post(control))
        .route("/logs", get(logs))
        .route("/registers", get(registers))
        .route("/memory", get(memory))
        .route("/execution-status", get(execution_status))
        .route("/health", get(health))
        .layer(middleware::from_fn(cors))
        .with_state(controller)
}

/// Serve the API on an already-bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Http` if the server fails.
pub async fn serve_on(
    listener: TcpListener,
    controller: SharedController,
    ct: CancellationToken,
) -> Result<()> {
    let app = router(controller);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Http(format!("server error: {err}")))?;

    info!("HTTP API shut down");
    Ok(())
}

/// Bind the configured address and serve the API until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Http` if the server fails to bind or serve.
pub async fn serve_http(controller: SharedController, ct: CancellationToken) -> Result<()> {
    let bind = controller.config().bind_addr();
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Http(format!("failed to bind HTTP API on {bind}: {err}")))?;

    info!(%bind, "starting HTTP API");
    serve_on(listener, controller, ct).await
}
