use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        maintenance_record::{self, Entity as MaintenanceRecord, MaintenanceStatus, MaintenanceType},
        vehicle::VehicleStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::vehicles::{load_vehicle, set_status, unwrap_transaction_error},
};

/// How far ahead the upcoming-maintenance view looks.
const UPCOMING_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaintenanceInput {
    pub vehicle_id: Uuid,
    pub maintenance_date: DateTime<Utc>,
    pub next_maintenance_date: Option<DateTime<Utc>>,
    pub maintenance_type: String,
    pub description: Option<String>,
    pub cost: Decimal,
    pub service_center: Option<String>,
    pub mileage: Option<i32>,
    pub status: String,
}

#[derive(Clone)]
pub struct MaintenanceService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaintenanceService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Records a maintenance entry. An IN_PROGRESS entry pulls the vehicle
    /// into IN_MAINTENANCE unless it is currently rented out.
    #[instrument(skip(self, input), fields(vehicle_id = %input.vehicle_id), err)]
    pub async fn create_record(
        &self,
        input: CreateMaintenanceInput,
    ) -> Result<maintenance_record::Model, ServiceError> {
        let status = MaintenanceStatus::parse(&input.status)?;
        let maintenance_type = MaintenanceType::parse(&input.maintenance_type)?;
        if input.cost < Decimal::ZERO {
            return Err(ServiceError::InvalidInput("Cost cannot be negative".into()));
        }

        let saved = self
            .db
            .transaction::<_, maintenance_record::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, input.vehicle_id).await?;

                    if status == MaintenanceStatus::InProgress {
                        if vehicle.status == VehicleStatus::Rented {
                            return Err(ServiceError::Conflict(format!(
                                "Vehicle {} is rented out and cannot enter maintenance",
                                vehicle.plate
                            )));
                        }
                        set_status(txn, vehicle, VehicleStatus::InMaintenance).await?;
                    }

                    let model = maintenance_record::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        vehicle_id: Set(input.vehicle_id),
                        maintenance_date: Set(input.maintenance_date),
                        next_maintenance_date: Set(input.next_maintenance_date),
                        maintenance_type: Set(maintenance_type),
                        description: Set(input.description),
                        cost: Set(input.cost),
                        service_center: Set(input.service_center),
                        mileage: Set(input.mileage),
                        status: Set(status),
                        created_at: Set(Utc::now()),
                    };
                    Ok(model.insert(txn).await?)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::MaintenanceRecorded {
                vehicle_id: saved.vehicle_id,
                record_id: saved.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }

    /// Edits an existing record in place: dates, cost, type, description
    /// and, when the submitted vehicle id differs, the vehicle linkage.
    /// Unlike the status transition, this never touches the vehicle status.
    #[instrument(skip(self, input), err)]
    pub async fn update_record(
        &self,
        record_id: Uuid,
        input: CreateMaintenanceInput,
    ) -> Result<maintenance_record::Model, ServiceError> {
        let status = MaintenanceStatus::parse(&input.status)?;
        let maintenance_type = MaintenanceType::parse(&input.maintenance_type)?;
        if input.cost < Decimal::ZERO {
            return Err(ServiceError::InvalidInput("Cost cannot be negative".into()));
        }

        let saved = self
            .db
            .transaction::<_, maintenance_record::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let record = MaintenanceRecord::find_by_id(record_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Maintenance record {} not found",
                                record_id
                            ))
                        })?;

                    if record.vehicle_id != input.vehicle_id {
                        load_vehicle(txn, input.vehicle_id).await?;
                    }

                    let mut active: maintenance_record::ActiveModel = record.into();
                    active.vehicle_id = Set(input.vehicle_id);
                    active.maintenance_date = Set(input.maintenance_date);
                    active.next_maintenance_date = Set(input.next_maintenance_date);
                    active.maintenance_type = Set(maintenance_type);
                    active.description = Set(input.description);
                    active.cost = Set(input.cost);
                    active.service_center = Set(input.service_center);
                    active.mileage = Set(input.mileage);
                    active.status = Set(status);
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(%record_id, "maintenance record updated");
        Ok(saved)
    }

    /// Moves a record to a new status and re-derives the vehicle status.
    ///
    /// The vehicle is released back to AVAILABLE in two cases, checked
    /// independently after the record is saved: when this update completed
    /// the last open record, and whenever no record of the vehicle is left
    /// IN_PROGRESS. An IN_PROGRESS update always forces IN_MAINTENANCE.
    #[instrument(skip(self), err)]
    pub async fn update_status(
        &self,
        record_id: Uuid,
        new_status: &str,
    ) -> Result<maintenance_record::Model, ServiceError> {
        let new_status = MaintenanceStatus::parse(new_status)?;

        let saved = self
            .db
            .transaction::<_, maintenance_record::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let record = MaintenanceRecord::find_by_id(record_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Maintenance record {} not found",
                                record_id
                            ))
                        })?;
                    let vehicle_id = record.vehicle_id;

                    let mut active: maintenance_record::ActiveModel = record.into();
                    active.status = Set(new_status);
                    let saved = active.update(txn).await?;

                    let vehicle = load_vehicle(txn, vehicle_id).await?;

                    if new_status == MaintenanceStatus::InProgress {
                        set_status(txn, vehicle, VehicleStatus::InMaintenance).await?;
                        return Ok(saved);
                    }

                    // Two release rules, applied independently.
                    let mut vehicle = vehicle;
                    if new_status == MaintenanceStatus::Completed
                        && all_records_completed(txn, vehicle_id).await?
                    {
                        vehicle = set_status(txn, vehicle, VehicleStatus::Available).await?;
                    }
                    if vehicle.status != VehicleStatus::Available
                        && !any_record_in_progress(txn, vehicle_id).await?
                    {
                        set_status(txn, vehicle, VehicleStatus::Available).await?;
                    }

                    Ok(saved)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::MaintenanceStatusChanged {
                record_id: saved.id,
                new_status: saved.status.as_str().to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(%record_id, status = %saved.status, "maintenance status updated");
        Ok(saved)
    }

    /// Full maintenance history of a vehicle, newest first.
    #[instrument(skip(self), err)]
    pub async fn maintenance_history(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<maintenance_record::Model>, ServiceError> {
        load_vehicle(self.db.as_ref(), vehicle_id).await?;

        Ok(MaintenanceRecord::find()
            .filter(maintenance_record::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(maintenance_record::Column::MaintenanceDate)
            .all(self.db.as_ref())
            .await?)
    }

    /// Records whose next maintenance falls inside the next two weeks,
    /// soonest first.
    #[instrument(skip(self), err)]
    pub async fn upcoming(&self) -> Result<Vec<maintenance_record::Model>, ServiceError> {
        let now = Utc::now();
        let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);

        Ok(MaintenanceRecord::find()
            .filter(maintenance_record::Column::NextMaintenanceDate.gte(now))
            .filter(maintenance_record::Column::NextMaintenanceDate.lte(horizon))
            .order_by_asc(maintenance_record::Column::NextMaintenanceDate)
            .all(self.db.as_ref())
            .await?)
    }
}

async fn all_records_completed<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<bool, ServiceError> {
    let open = MaintenanceRecord::find()
        .filter(maintenance_record::Column::VehicleId.eq(vehicle_id))
        .filter(maintenance_record::Column::Status.ne(MaintenanceStatus::Completed))
        .one(conn)
        .await?;
    Ok(open.is_none())
}

async fn any_record_in_progress<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<bool, ServiceError> {
    let in_progress = MaintenanceRecord::find()
        .filter(maintenance_record::Column::VehicleId.eq(vehicle_id))
        .filter(maintenance_record::Column::Status.eq(MaintenanceStatus::InProgress))
        .one(conn)
        .await?;
    Ok(in_progress.is_some())
}
