use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{roles, AuthUser},
    errors::ServiceError,
    handlers::AppState,
    services::sales::SellVehicleInput,
};

pub fn sales_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/eligible", get(eligible_for_sale))
        .route("/:id", post(sell_vehicle).get(sales_history))
        .route("/:id/mark-for-sale", post(mark_for_sale))
        .route("/:id/remove-from-sale", post(remove_from_sale))
}

#[derive(Debug, Deserialize)]
struct EligibilityQuery {
    max_age_years: Option<i32>,
    min_mileage: Option<i32>,
}

/// Defaults mirror the fleet-renewal policy: 5+ years old and 100k+ km.
async fn eligible_for_sale(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<EligibilityQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let vehicles = state
        .sales
        .eligible_for_sale(
            query.max_age_years.unwrap_or(5),
            query.min_mileage.unwrap_or(100_000),
        )
        .await?;
    Ok(Json(vehicles))
}

async fn mark_for_sale(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let vehicle = state.sales.mark_for_sale(id).await?;
    Ok(Json(vehicle))
}

async fn sell_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SellVehicleInput>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let sale = state.sales.sell_vehicle(id, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn remove_from_sale(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let vehicle = state.sales.remove_from_sale(id).await?;
    Ok(Json(vehicle))
}

async fn sales_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(roles::STAFF)?;
    let sales = state.sales.sales_history(id).await?;
    Ok(Json(sales))
}
