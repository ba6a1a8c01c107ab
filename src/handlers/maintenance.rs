use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    handlers::AppState,
    services::maintenance::CreateMaintenanceInput,
};

pub fn maintenance_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_record))
        .route("/:id", put(update_record))
        .route("/:id/status", patch(update_status))
        .route("/vehicle/:id", get(maintenance_history))
        .route("/upcoming", get(upcoming))
}

async fn create_record(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(input): Json<CreateMaintenanceInput>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let record = state.maintenance.create_record(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateMaintenanceInput>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let record = state.maintenance.update_record(id, input).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let record = state.maintenance.update_status(id, &body.status).await?;
    Ok(Json(record))
}

async fn maintenance_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let records = state.maintenance.maintenance_history(id).await?;
    Ok(Json(records))
}

/// Records due for service within the next two weeks.
async fn upcoming(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let records = state.maintenance.upcoming().await?;
    Ok(Json(records))
}
