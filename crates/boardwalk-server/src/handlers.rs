//! HTTP request handlers for the board service.
//!
//! Each handler parses the request, calls one engine operation and maps
//! the outcome onto a status code and JSON body.

use crate::conversions::{
    parse_board_id, parse_column_id, parse_task_id, BoardResponse, BoardViewResponse,
    ColumnResponse, ConversionError, CreateBoardRequest, CreateColumnRequest, CreateTaskRequest,
    MoveTaskRequest, TaskResponse, UpdateBoardRequest, UpdateColumnRequest, UpdateTaskRequest,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router as AxumRouter,
};
use boardwalk_engine::{BoardEngine, EngineError};
use boardwalk_store::SqliteStore;
use serde::{Deserialize, Serialize};

/// Header carrying the acting identity
pub const USER_ID_HEADER: &str = "x-user-id";

/// Engine over the SQLite gateway
pub type Engine = BoardEngine<SqliteStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Hierarchy engine
    pub engine: Engine,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Set when a multi-step mutation stopped halfway
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    /// Engine rejected or failed the operation
    Engine(EngineError),
    /// Request could not be parsed
    BadRequest(String),
    /// No identity supplied
    Unauthorized,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Engine(e) => match e {
                EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                EngineError::BoardNotFound(_) => (StatusCode::NOT_FOUND, "board_not_found"),
                EngineError::ColumnNotFound(_) => (StatusCode::NOT_FOUND, "column_not_found"),
                EngineError::DestinationColumnNotFound(_) => {
                    (StatusCode::NOT_FOUND, "destination_column_not_found")
                }
                EngineError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "task_not_found"),
                EngineError::AlreadyExists(_) => (StatusCode::CONFLICT, "already_exists"),
                EngineError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure"),
                EngineError::PartiallyApplied { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "partially_applied")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let partial = matches!(self, ApiError::Engine(EngineError::PartiallyApplied { .. }));
        let message = match self {
            ApiError::Engine(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized => format!("missing {} header", USER_ID_HEADER),
        };

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        }

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            partial,
        });
        (status, body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

/// Malformed or mistyped bodies become 400 with the usual error body
impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<ConversionError> for ApiError {
    fn from(e: ConversionError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Acting identity from the `x-user-id` header
fn identity(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)
}

/// GET /health
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /boards
async fn create_board(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateBoardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BoardViewResponse>), ApiError> {
    let Json(request) = body?;
    let owner = identity(&headers)?;
    let view = state.engine.create_board(&owner, request.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

/// GET /boards
async fn list_boards(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BoardResponse>>, ApiError> {
    let owner = identity(&headers)?;
    let boards = state.engine.list_boards(&owner).await?;
    Ok(Json(boards.into_iter().map(Into::into).collect()))
}

/// GET /boards/:id
async fn get_board_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BoardViewResponse>, ApiError> {
    let view = state.engine.get_board_info(parse_board_id(&id)?).await?;
    Ok(Json(view.into()))
}

/// PATCH /boards/:id
async fn update_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBoardRequest>, JsonRejection>,
) -> Result<Json<BoardResponse>, ApiError> {
    let Json(request) = body?;
    let board_id = parse_board_id(&id)?;
    let board = state
        .engine
        .update_board(board_id, request.into_patch()?)
        .await?;
    Ok(Json(board.into()))
}

/// DELETE /boards/:id
async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_board(parse_board_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /boards/:id/columns
async fn list_columns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ColumnResponse>>, ApiError> {
    let columns = state.engine.list_columns(parse_board_id(&id)?).await?;
    Ok(Json(columns.into_iter().map(Into::into).collect()))
}

/// POST /boards/:id/columns
async fn create_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CreateColumnRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ColumnResponse>), ApiError> {
    let Json(request) = body?;
    let board_id = parse_board_id(&id)?;
    let column = state
        .engine
        .create_column(request.into_input(board_id))
        .await?;
    Ok((StatusCode::CREATED, Json(column.into())))
}

/// PATCH /columns/:id
async fn update_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateColumnRequest>, JsonRejection>,
) -> Result<Json<ColumnResponse>, ApiError> {
    let Json(request) = body?;
    let column_id = parse_column_id(&id)?;
    let column = state
        .engine
        .update_column(column_id, request.into())
        .await?;
    Ok(Json(column.into()))
}

/// DELETE /columns/:id
async fn delete_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_column(parse_column_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /columns/:id/tasks
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(request) = body?;
    let owner = identity(&headers)?;
    let input = request.into_input(parse_column_id(&id)?)?;
    let task = state.engine.create_task(&owner, input).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// GET /tasks/:id
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.engine.get_task(parse_task_id(&id)?).await?;
    Ok(Json(task.into()))
}

/// PATCH /tasks/:id
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(request) = body?;
    let task_id = parse_task_id(&id)?;
    let task = state
        .engine
        .update_task(task_id, request.into_patch()?)
        .await?;
    Ok(Json(task.into()))
}

/// POST /tasks/:id/move
async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<MoveTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(request) = body?;
    let input = request.into_input(parse_task_id(&id)?)?;
    let task = state.engine.move_task(input).await?;
    Ok(Json(task.into()))
}

/// DELETE /tasks/:id
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_task(parse_task_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/boards", post(create_board).get(list_boards))
        .route(
            "/boards/:id",
            get(get_board_info).patch(update_board).delete(delete_board),
        )
        .route("/boards/:id/columns", get(list_columns).post(create_column))
        .route("/columns/:id", patch(update_column).delete(delete_column))
        .route("/columns/:id/tasks", post(create_task))
        .route("/tasks/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/tasks/:id/move", post(move_task))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use boardwalk_domain::BoardId;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        AppState {
            engine: BoardEngine::new(SqliteStore::in_memory().unwrap()),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_identity_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(identity(&headers), Err(ApiError::Unauthorized)));

        headers.insert(USER_ID_HEADER, "  ".parse().unwrap());
        assert!(matches!(identity(&headers), Err(ApiError::Unauthorized)));

        headers.insert(USER_ID_HEADER, "alice".parse().unwrap());
        assert_eq!(identity(&headers).unwrap(), "alice");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                EngineError::InvalidInput("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::BoardNotFound(BoardId::new()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::AlreadyExists("x".into()).into(),
                StatusCode::CONFLICT,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.parts().0, status);
        }
    }
}
