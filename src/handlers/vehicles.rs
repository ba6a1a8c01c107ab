use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    handlers::AppState,
    services::vehicles::VehicleInput,
};

pub fn vehicles_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_vehicles).post(register_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

/// Customers only see what they can rent; staff see the whole fleet.
async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[roles::ADMIN, roles::EMPLOYEE, roles::CUSTOMER])?;
    let vehicles = state.vehicles.list_vehicles(&user).await?;
    Ok(Json(vehicles))
}

async fn register_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(input): Json<VehicleInput>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[roles::ADMIN])?;
    let vehicle = state.vehicles.register_vehicle(input).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[roles::ADMIN, roles::EMPLOYEE, roles::CUSTOMER])?;
    let vehicle = state.vehicles.get_vehicle(id).await?;
    Ok(Json(vehicle))
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<VehicleInput>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[roles::ADMIN])?;
    let vehicle = state.vehicles.update_vehicle(id, input).await?;
    Ok(Json(vehicle))
}

/// Deletes the vehicle and all of its rentals, invoices, sales and
/// maintenance records.
async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[roles::ADMIN])?;
    state.vehicles.delete_vehicle_with_dependencies(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
