//! Fleet API Library
//!
//! Core functionality for the rental-fleet management API: vehicle
//! registry, rental lifecycle, invoicing, maintenance coordination and
//! vehicle sales.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

pub use handlers::AppState;

use std::sync::Arc;

use axum::Router;

use crate::{
    events::EventSender,
    services::{
        FsContractRenderer, MaintenanceService, RentalService, SaleService, VehicleService,
    },
};

impl AppState {
    /// Wires every service onto one DB pool and event channel.
    pub fn build(
        db: Arc<db::DbPool>,
        event_sender: Arc<EventSender>,
        contracts_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        let renderer = Arc::new(FsContractRenderer::new(contracts_dir));
        Self {
            db: db.clone(),
            vehicles: VehicleService::new(db.clone(), event_sender.clone()),
            rentals: RentalService::new(db.clone(), event_sender.clone(), renderer),
            maintenance: MaintenanceService::new(db.clone(), event_sender.clone()),
            sales: SaleService::new(db, event_sender),
        }
    }
}

/// Business routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    handlers::api_routes()
}
