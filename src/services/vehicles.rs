use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{
        invoice,
        maintenance_record,
        rental,
        vehicle::{self, Entity as Vehicle, VehicleStatus},
        vehicle_sale,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

// ---------------------------------------------------------------------------
// Vehicle status registry
//
// These helpers are the only place vehicle status is read and written. They
// do not validate transitions; each workflow service checks the current
// status before calling set_status, inside its own transaction.
// ---------------------------------------------------------------------------

/// Loads a vehicle or fails with NotFound.
pub async fn load_vehicle<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<vehicle::Model, ServiceError> {
    Vehicle::find_by_id(vehicle_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", vehicle_id)))
}

/// Current status of a vehicle.
pub async fn get_status<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<VehicleStatus, ServiceError> {
    Ok(load_vehicle(conn, vehicle_id).await?.status)
}

/// Writes a new status. Callers must have verified legality against the
/// current status within the same transaction.
pub async fn set_status<C: ConnectionTrait>(
    conn: &C,
    current: vehicle::Model,
    status: VehicleStatus,
) -> Result<vehicle::Model, ServiceError> {
    let old_status = current.status;
    let mut active: vehicle::ActiveModel = current.into();
    active.status = Set(status);
    active.updated_at = Set(Some(Utc::now()));
    let updated = active.update(conn).await?;

    info!(vehicle_id = %updated.id, %old_status, new_status = %status, "vehicle status changed");
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Fleet CRUD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleInput {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate: String,
    pub daily_price: Decimal,
    pub mileage: i32,
}

impl VehicleInput {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.brand.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Brand must not be blank".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Model must not be blank".into()));
        }
        if self.plate.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Plate must not be blank".into()));
        }
        let current_year = Utc::now().year();
        if self.year <= 1900 || self.year > current_year + 1 {
            return Err(ServiceError::InvalidInput(format!(
                "Year must be between 1901 and {}",
                current_year + 1
            )));
        }
        if self.daily_price <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Daily price must be positive".into(),
            ));
        }
        if self.mileage < 0 {
            return Err(ServiceError::InvalidInput(
                "Mileage cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct VehicleService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl VehicleService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a vehicle to the fleet with status AVAILABLE.
    #[instrument(skip(self, input), err)]
    pub async fn register_vehicle(
        &self,
        input: VehicleInput,
    ) -> Result<vehicle::Model, ServiceError> {
        input.validate()?;

        let plate = input.plate.trim().to_string();
        let exists = Vehicle::find()
            .filter(vehicle::Column::Plate.eq(plate.clone()))
            .one(self.db.as_ref())
            .await?
            .is_some();
        if exists {
            return Err(ServiceError::Conflict(format!(
                "A vehicle with plate {} is already registered",
                plate
            )));
        }

        let model = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand: Set(input.brand.trim().to_string()),
            model: Set(input.model.trim().to_string()),
            year: Set(input.year),
            plate: Set(plate),
            daily_price: Set(input.daily_price),
            mileage: Set(input.mileage),
            status: Set(VehicleStatus::Available),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let saved = model.insert(self.db.as_ref()).await?;

        self.event_sender
            .send(Event::VehicleRegistered(saved.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }

    /// Lists the fleet. Customers only see vehicles currently AVAILABLE.
    #[instrument(skip(self, user), err)]
    pub async fn list_vehicles(&self, user: &AuthUser) -> Result<Vec<vehicle::Model>, ServiceError> {
        let mut query = Vehicle::find().order_by_asc(vehicle::Column::Plate);
        if user.is_customer_only() {
            query = query.filter(vehicle::Column::Status.eq(VehicleStatus::Available));
        }
        Ok(query.all(self.db.as_ref()).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn get_vehicle(&self, vehicle_id: Uuid) -> Result<vehicle::Model, ServiceError> {
        load_vehicle(self.db.as_ref(), vehicle_id).await
    }

    /// Updates the descriptive fields of a vehicle; status is untouched.
    #[instrument(skip(self, input), err)]
    pub async fn update_vehicle(
        &self,
        vehicle_id: Uuid,
        input: VehicleInput,
    ) -> Result<vehicle::Model, ServiceError> {
        input.validate()?;

        let existing = load_vehicle(self.db.as_ref(), vehicle_id).await?;

        let plate = input.plate.trim().to_string();
        if plate != existing.plate {
            let taken = Vehicle::find()
                .filter(vehicle::Column::Plate.eq(plate.clone()))
                .one(self.db.as_ref())
                .await?
                .is_some();
            if taken {
                return Err(ServiceError::Conflict(format!(
                    "A vehicle with plate {} is already registered",
                    plate
                )));
            }
        }

        let mut active: vehicle::ActiveModel = existing.into();
        active.brand = Set(input.brand.trim().to_string());
        active.model = Set(input.model.trim().to_string());
        active.year = Set(input.year);
        active.plate = Set(plate);
        active.daily_price = Set(input.daily_price);
        active.mileage = Set(input.mileage);
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Removes a vehicle and every dependent record in one transaction:
    /// invoices of its rentals, the rentals, sale records, maintenance
    /// records, and finally the vehicle row itself.
    #[instrument(skip(self), err)]
    pub async fn delete_vehicle_with_dependencies(
        &self,
        vehicle_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, vehicle_id).await?;

                    let rental_ids: Vec<Uuid> = rental::Entity::find()
                        .filter(rental::Column::VehicleId.eq(vehicle_id))
                        .all(txn)
                        .await?
                        .into_iter()
                        .map(|r| r.id)
                        .collect();

                    if !rental_ids.is_empty() {
                        invoice::Entity::delete_many()
                            .filter(invoice::Column::RentalId.is_in(rental_ids.clone()))
                            .exec(txn)
                            .await?;
                    }

                    rental::Entity::delete_many()
                        .filter(rental::Column::VehicleId.eq(vehicle_id))
                        .exec(txn)
                        .await?;

                    vehicle_sale::Entity::delete_many()
                        .filter(vehicle_sale::Column::VehicleId.eq(vehicle_id))
                        .exec(txn)
                        .await?;

                    maintenance_record::Entity::delete_many()
                        .filter(maintenance_record::Column::VehicleId.eq(vehicle_id))
                        .exec(txn)
                        .await?;

                    Vehicle::delete_by_id(vehicle.id).exec(txn).await?;

                    info!(%vehicle_id, rentals = rental_ids.len(), "vehicle deleted with dependencies");
                    Ok(())
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleDeleted(vehicle_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}

/// Transactions carry their own error wrapper; flatten it back to ours.
pub(crate) fn unwrap_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> VehicleInput {
        VehicleInput {
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2021,
            plate: "34 ABC 123".into(),
            daily_price: dec!(100),
            mileage: 42_000,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        for field in ["brand", "model", "plate"] {
            let mut i = input();
            match field {
                "brand" => i.brand = "  ".into(),
                "model" => i.model = String::new(),
                _ => i.plate = " ".into(),
            }
            assert!(i.validate().is_err(), "{field} should be required");
        }
    }

    #[test]
    fn test_year_bounds() {
        let mut i = input();
        i.year = 1900;
        assert!(i.validate().is_err());

        let mut i = input();
        i.year = Utc::now().year() + 2;
        assert!(i.validate().is_err());

        let mut i = input();
        i.year = Utc::now().year() + 1;
        assert!(i.validate().is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut i = input();
        i.daily_price = Decimal::ZERO;
        assert!(i.validate().is_err());

        i.daily_price = dec!(-5);
        assert!(i.validate().is_err());
    }

    #[test]
    fn test_negative_mileage_rejected() {
        let mut i = input();
        i.mileage = -1;
        assert!(i.validate().is_err());
    }
}
