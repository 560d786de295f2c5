//! REST routes for tasks.
//!
//! | Method | Path          | Body       | Response                  |
//! |--------|---------------|------------|---------------------------|
//! | GET    | `/tasks`      |            | `{ tasks, msg }`          |
//! | POST   | `/tasks`      | `FormData` | `{ task, msg }` (201)     |
//! | GET    | `/tasks/{id}` |            | `{ task, msg }`           |
//! | PUT    | `/tasks/{id}` | `FormData` | `{ task, msg }`           |
//!
//! Errors are `{ msg }` with 400 (bad body), 401 (token mismatch), or
//! 404 (unknown id).

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use taskdesk_proto::form::FormData;
use taskdesk_proto::task::{MessageBody, TaskEnvelope, TaskId, TaskListEnvelope};
use taskdesk_proto::validation::{EntityKind, validate_many_fields};

use crate::store::{StoreError, TaskStore};

/// Shared server state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Task storage.
    pub store: TaskStore,
    /// Token every request must present, if set.
    token: Option<String>,
}

impl AppState {
    /// State with an empty store and no token check.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `token` in the `Authorization` header. Blank disables the check.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = &self.token else {
            return Ok(());
        };
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));
        if presented == Some(expected.as_str()) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Failure of a request, rendered as a `{ msg }` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The body failed to parse or validate.
    #[error("{0}")]
    BadRequest(String),

    /// Store lookup or update failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Store(StoreError::InvalidStatus(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        (status, Json(MessageBody::new(self.to_string()))).into_response()
    }
}

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task))
        .with_state(state)
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TaskListEnvelope>, ApiError> {
    state.authorize(&headers)?;
    let tasks = state.store.list().await;
    Ok(Json(TaskListEnvelope {
        tasks,
        msg: Some("Tasks found successfully".to_string()),
    }))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    state.authorize(&headers)?;
    let task = state.store.get(&TaskId::new(id)).await?;
    Ok(Json(TaskEnvelope {
        task,
        msg: Some("Task found successfully".to_string()),
    }))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<FormData>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskEnvelope>), ApiError> {
    state.authorize(&headers)?;
    let Json(data) = body?;
    check(&data)?;
    let task = state.store.create(data).await?;
    tracing::info!(task_id = %task.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskEnvelope {
            task,
            msg: Some("Task created successfully".to_string()),
        }),
    ))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<FormData>, JsonRejection>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    state.authorize(&headers)?;
    let Json(data) = body?;
    check(&data)?;
    let task = state.store.update(&TaskId::new(id), data).await?;
    tracing::info!(task_id = %task.id, "task updated");
    Ok(Json(TaskEnvelope {
        task,
        msg: Some("Task updated successfully".to_string()),
    }))
}

/// Run the shared task rules over an incoming body.
fn check(data: &FormData) -> Result<(), ApiError> {
    let errors = validate_many_fields(EntityKind::Task, &data.to_field_map());
    if errors.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.err))
        .collect();
    Err(ApiError::BadRequest(format!(
        "Invalid task ({})",
        details.join("; ")
    )))
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(AppState::new())).await
}

/// Starts the server with a pre-configured [`AppState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}
