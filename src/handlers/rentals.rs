use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    handlers::AppState,
    services::rentals::RentVehicleInput,
};

pub fn rentals_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id/rent", post(rent_vehicle))
        .route("/:id/return", post(return_vehicle))
        .route("/:id/rentals", get(rental_history))
        .route("/:id/contract", get(download_active_contract))
        .route("/:id/contracts/:rental_id", get(download_contract))
}

#[derive(Debug, Deserialize)]
struct RentVehicleRequest {
    customer_name: String,
    customer_national_id: String,
    customer_phone: String,
    end_date: NaiveDate,
}

async fn rent_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RentVehicleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let rental = state
        .rentals
        .rent_vehicle(RentVehicleInput {
            vehicle_id: id,
            customer_name: body.customer_name,
            customer_national_id: body.customer_national_id,
            customer_phone: body.customer_phone,
            end_date: body.end_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

async fn return_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let summary = state.rentals.return_vehicle(id).await?;
    Ok(Json(summary))
}

async fn rental_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let history = state.rentals.rental_history(id).await?;
    Ok(Json(history))
}

async fn download_active_contract(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    serve_contract(&state, id, None).await
}

async fn download_contract(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, rental_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    serve_contract(&state, id, Some(rental_id)).await
}

async fn serve_contract(
    state: &AppState,
    vehicle_id: Uuid,
    rental_id: Option<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let path = state.rentals.contract_locator(vehicle_id, rental_id).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ServiceError::DocumentError(format!("Failed to read contract: {e}")))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract.txt".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}
