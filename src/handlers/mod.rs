use std::sync::Arc;

use axum::Router;

use crate::{
    db::DbPool,
    services::{MaintenanceService, RentalService, SaleService, VehicleService},
};

pub mod health;
pub mod maintenance;
pub mod rentals;
pub mod sales;
pub mod vehicles;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub vehicles: VehicleService,
    pub rentals: RentalService,
    pub maintenance: MaintenanceService,
    pub sales: SaleService,
}

/// All `/api/v1` business routes. Health probes are mounted separately so
/// they bypass authentication.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest(
            "/vehicles",
            vehicles::vehicles_router().merge(rentals::rentals_router()),
        )
        .nest("/maintenance", maintenance::maintenance_router())
        .nest("/sales", sales::sales_router())
}
