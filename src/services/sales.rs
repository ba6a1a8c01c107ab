use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        vehicle::{self, Entity as Vehicle, VehicleStatus},
        vehicle_sale::{self, Entity as VehicleSale, UNKNOWN_PAYMENT_METHOD},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::vehicles::{load_vehicle, set_status, unwrap_transaction_error},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SellVehicleInput {
    pub customer_name: String,
    pub customer_national_id: String,
    pub customer_phone: String,
    pub sale_price: Decimal,
    pub sale_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

impl SellVehicleInput {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.sale_price <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Sale price must be positive".into(),
            ));
        }
        if self.customer_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Customer name must not be blank".into(),
            ));
        }
        if self.customer_national_id.trim().len() != 11 {
            return Err(ServiceError::InvalidInput(
                "National id must be exactly 11 characters".into(),
            ));
        }
        if self.customer_phone.trim().len() < 10 {
            return Err(ServiceError::InvalidInput(
                "Phone number must be at least 10 characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SaleService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Vehicles old and worn enough to be offered for sale. SOLD vehicles
    /// are excluded; every other status is listed so staff can see what
    /// could be freed up.
    #[instrument(skip(self), err)]
    pub async fn eligible_for_sale(
        &self,
        max_age_years: i32,
        min_mileage: i32,
    ) -> Result<Vec<vehicle::Model>, ServiceError> {
        let cutoff_year = Utc::now().year() - max_age_years;

        Ok(Vehicle::find()
            .filter(
                Condition::all()
                    .add(vehicle::Column::Year.lte(cutoff_year))
                    .add(vehicle::Column::Mileage.gte(min_mileage))
                    .add(vehicle::Column::Status.ne(VehicleStatus::Sold)),
            )
            .order_by_asc(vehicle::Column::Year)
            .all(self.db.as_ref())
            .await?)
    }

    /// Puts a vehicle on the sales list. Rented, in-maintenance and sold
    /// vehicles stay where they are.
    #[instrument(skip(self), err)]
    pub async fn mark_for_sale(&self, vehicle_id: Uuid) -> Result<vehicle::Model, ServiceError> {
        let updated = self
            .db
            .transaction::<_, vehicle::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, vehicle_id).await?;
                    match vehicle.status {
                        VehicleStatus::Rented
                        | VehicleStatus::InMaintenance
                        | VehicleStatus::Sold => Err(ServiceError::Conflict(format!(
                            "Vehicle {} cannot be put up for sale (status: {})",
                            vehicle.plate, vehicle.status
                        ))),
                        _ => set_status(txn, vehicle, VehicleStatus::ForSale).await,
                    }
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleMarkedForSale(vehicle_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Completes a sale: marks the vehicle SOLD and records the transaction,
    /// atomically. A vehicle can be sold from any status except SOLD.
    #[instrument(skip(self, input), err)]
    pub async fn sell_vehicle(
        &self,
        vehicle_id: Uuid,
        input: SellVehicleInput,
    ) -> Result<vehicle_sale::Model, ServiceError> {
        input.validate()?;

        let saved = self
            .db
            .transaction::<_, vehicle_sale::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, vehicle_id).await?;
                    if vehicle.status == VehicleStatus::Sold {
                        return Err(ServiceError::Conflict(format!(
                            "Vehicle {} has already been sold",
                            vehicle.plate
                        )));
                    }

                    set_status(txn, vehicle, VehicleStatus::Sold).await?;

                    let payment_method = input
                        .payment_method
                        .as_deref()
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .unwrap_or(UNKNOWN_PAYMENT_METHOD)
                        .to_string();

                    let model = vehicle_sale::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        vehicle_id: Set(vehicle_id),
                        customer_name: Set(input.customer_name.trim().to_string()),
                        customer_national_id: Set(input.customer_national_id.trim().to_string()),
                        customer_phone: Set(input.customer_phone.trim().to_string()),
                        sale_date: Set(input.sale_date.unwrap_or_else(|| Utc::now().date_naive())),
                        sale_price: Set(input.sale_price),
                        payment_method: Set(payment_method),
                        created_at: Set(Utc::now()),
                    };
                    Ok(model.insert(txn).await?)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleSold {
                vehicle_id,
                sale_id: saved.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(%vehicle_id, sale_id = %saved.id, "vehicle sold");
        Ok(saved)
    }

    /// Takes a vehicle off the sales list; only valid from FOR_SALE.
    #[instrument(skip(self), err)]
    pub async fn remove_from_sale(&self, vehicle_id: Uuid) -> Result<vehicle::Model, ServiceError> {
        let updated = self
            .db
            .transaction::<_, vehicle::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, vehicle_id).await?;
                    if vehicle.status != VehicleStatus::ForSale {
                        return Err(ServiceError::Conflict(format!(
                            "Vehicle {} is not up for sale (status: {})",
                            vehicle.plate, vehicle.status
                        )));
                    }
                    set_status(txn, vehicle, VehicleStatus::Available).await
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleRemovedFromSale(vehicle_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Sale transactions recorded for a vehicle, newest first.
    #[instrument(skip(self), err)]
    pub async fn sales_history(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<vehicle_sale::Model>, ServiceError> {
        load_vehicle(self.db.as_ref(), vehicle_id).await?;

        Ok(VehicleSale::find()
            .filter(vehicle_sale::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(vehicle_sale::Column::SaleDate)
            .all(self.db.as_ref())
            .await?)
    }
}
