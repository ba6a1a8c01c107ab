use std::{path::PathBuf, sync::Arc};

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        invoice,
        rental::{self, Entity as Rental},
        vehicle::VehicleStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        documents::{self, ContractRenderer, RentalContractData},
        invoicing,
        vehicles::{load_vehicle, set_status, unwrap_transaction_error},
    },
};

/// The rental always starts today; callers only choose the planned return.
#[derive(Debug, Clone, Deserialize)]
pub struct RentVehicleInput {
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_national_id: String,
    pub customer_phone: String,
    pub end_date: NaiveDate,
}

impl RentVehicleInput {
    fn validate(&self, today: NaiveDate) -> Result<(), ServiceError> {
        if self.customer_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Customer name must not be blank".into(),
            ));
        }
        if self.customer_national_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "National id must not be blank".into(),
            ));
        }
        if self.customer_phone.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Phone number must not be blank".into(),
            ));
        }
        if self.end_date <= today {
            return Err(ServiceError::InvalidInput(
                "End date must be after today".into(),
            ));
        }
        Ok(())
    }
}

/// Returned by `return_vehicle`; everything the closing screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummary {
    pub invoice_id: Uuid,
    pub rental_id: Uuid,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub plate: String,
    pub vehicle_name: String,
    pub customer_name: String,
    pub planned_days: i64,
    pub base_amount: rust_decimal::Decimal,
    pub late_fee: rust_decimal::Decimal,
    pub late_fee_description: Option<String>,
    pub total_amount: rust_decimal::Decimal,
}

/// One row of the rental history view.
#[derive(Debug, Clone, Serialize)]
pub struct RentalHistoryEntry {
    pub rental: rental::Model,
    pub plate: String,
    pub vehicle_name: String,
    pub status_label: &'static str,
    pub invoice_number: Option<String>,
    pub total_amount: Option<rust_decimal::Decimal>,
}

#[derive(Clone)]
pub struct RentalService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    renderer: Arc<dyn ContractRenderer>,
}

impl RentalService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        renderer: Arc<dyn ContractRenderer>,
    ) -> Self {
        Self {
            db,
            event_sender,
            renderer,
        }
    }

    /// Opens a rental: records the contract, flips the vehicle to RENTED and
    /// writes the contract document, all in one transaction. A render failure
    /// rolls everything back.
    #[instrument(skip(self, input), fields(vehicle_id = %input.vehicle_id), err)]
    pub async fn rent_vehicle(&self, input: RentVehicleInput) -> Result<rental::Model, ServiceError> {
        let today = Utc::now().date_naive();
        input.validate(today)?;

        let renderer = Arc::clone(&self.renderer);
        let saved = self
            .db
            .transaction::<_, rental::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, input.vehicle_id).await?;
                    if vehicle.status != VehicleStatus::Available {
                        return Err(ServiceError::Conflict(format!(
                            "Vehicle {} is not available for rent (status: {})",
                            vehicle.plate, vehicle.status
                        )));
                    }

                    let model = rental::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        vehicle_id: Set(vehicle.id),
                        customer_name: Set(input.customer_name.trim().to_string()),
                        customer_national_id: Set(input.customer_national_id.trim().to_string()),
                        customer_phone: Set(input.customer_phone.trim().to_string()),
                        start_date: Set(today),
                        end_date: Set(input.end_date),
                        return_date: Set(None),
                        active: Set(true),
                        created_at: Set(Utc::now()),
                    };
                    let saved = model.insert(txn).await?;

                    let vehicle = set_status(txn, vehicle, VehicleStatus::Rented).await?;

                    let contract = RentalContractData {
                        rental_id: saved.id,
                        plate: vehicle.plate.clone(),
                        brand: vehicle.brand.clone(),
                        model: vehicle.model.clone(),
                        year: vehicle.year,
                        daily_price: vehicle.daily_price,
                        customer_name: saved.customer_name.clone(),
                        start_date: saved.start_date,
                        end_date: saved.end_date,
                    };
                    let path = renderer.render(&contract).await?;
                    info!(rental_id = %saved.id, contract = %path.display(), "rental opened");

                    Ok(saved)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleRented {
                vehicle_id: saved.vehicle_id,
                rental_id: saved.id,
                end_date: saved.end_date,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }

    /// Closes the active rental of a vehicle: issues the invoice, marks the
    /// rental returned and releases the vehicle back to AVAILABLE.
    #[instrument(skip(self), err)]
    pub async fn return_vehicle(&self, vehicle_id: Uuid) -> Result<InvoiceSummary, ServiceError> {
        let today = Utc::now().date_naive();

        let summary = self
            .db
            .transaction::<_, InvoiceSummary, ServiceError>(move |txn| {
                Box::pin(async move {
                    let vehicle = load_vehicle(txn, vehicle_id).await?;

                    let open = Rental::find()
                        .filter(rental::Column::VehicleId.eq(vehicle_id))
                        .filter(rental::Column::Active.eq(true))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::Conflict(format!(
                                "Vehicle {} has no active rental",
                                vehicle.plate
                            ))
                        })?;

                    let draft = invoicing::compute_invoice(&open, vehicle.daily_price, today)?;

                    let invoice_model = invoice::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        invoice_number: Set(draft.invoice_number.clone()),
                        issue_date: Set(draft.issue_date),
                        rental_id: Set(open.id),
                        base_amount: Set(draft.base_amount),
                        late_fee: Set(draft.late_fee),
                        late_fee_description: Set(draft.late_fee_description.clone()),
                        total_amount: Set(draft.total_amount),
                        created_at: Set(Utc::now()),
                    };
                    let saved_invoice = invoice_model.insert(txn).await?;

                    let mut closing: rental::ActiveModel = open.clone().into();
                    closing.active = Set(false);
                    closing.return_date = Set(Some(today));
                    closing.update(txn).await?;

                    set_status(txn, vehicle.clone(), VehicleStatus::Available).await?;

                    Ok(InvoiceSummary {
                        invoice_id: saved_invoice.id,
                        rental_id: open.id,
                        invoice_number: saved_invoice.invoice_number,
                        issue_date: saved_invoice.issue_date,
                        plate: vehicle.plate,
                        vehicle_name: format!("{} {}", vehicle.brand, vehicle.model),
                        customer_name: open.customer_name,
                        planned_days: draft.planned_days,
                        base_amount: draft.base_amount,
                        late_fee: draft.late_fee,
                        late_fee_description: draft.late_fee_description,
                        total_amount: draft.total_amount,
                    })
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send(Event::VehicleReturned {
                vehicle_id,
                rental_id: summary.rental_id,
                invoice_number: summary.invoice_number.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(summary)
    }

    /// Full rental history of a vehicle, newest first, each row enriched
    /// with its invoice when one was issued.
    #[instrument(skip(self), err)]
    pub async fn rental_history(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<RentalHistoryEntry>, ServiceError> {
        let vehicle = load_vehicle(self.db.as_ref(), vehicle_id).await?;

        let rentals = Rental::find()
            .filter(rental::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(rental::Column::StartDate)
            .find_with_related(invoice::Entity)
            .all(self.db.as_ref())
            .await?;

        let vehicle_name = format!("{} {}", vehicle.brand, vehicle.model);
        Ok(rentals
            .into_iter()
            .map(|(rental, mut invoices)| {
                let invoice = if invoices.is_empty() {
                    None
                } else {
                    Some(invoices.swap_remove(0))
                };
                RentalHistoryEntry {
                    status_label: rental.status_label(),
                    plate: vehicle.plate.clone(),
                    vehicle_name: vehicle_name.clone(),
                    invoice_number: invoice.as_ref().map(|i| i.invoice_number.clone()),
                    total_amount: invoice.as_ref().map(|i| i.total_amount),
                    rental,
                }
            })
            .collect())
    }

    /// Resolves the contract file for a vehicle's rental, the active one
    /// when no rental id is given. Contracts written before the id-based
    /// naming scheme are found by plate as a fallback.
    #[instrument(skip(self), err)]
    pub async fn contract_locator(
        &self,
        vehicle_id: Uuid,
        rental_id: Option<Uuid>,
    ) -> Result<PathBuf, ServiceError> {
        let vehicle = load_vehicle(self.db.as_ref(), vehicle_id).await?;

        let mut query = Rental::find().filter(rental::Column::VehicleId.eq(vehicle_id));
        query = match rental_id {
            Some(id) => query.filter(rental::Column::Id.eq(id)),
            None => query.filter(rental::Column::Active.eq(true)),
        };
        let rental = query.one(self.db.as_ref()).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("No matching rental for vehicle {}", vehicle.plate))
        })?;

        let primary = self.renderer.contract_path(rental.id);
        if documents::locator_exists(&primary).await {
            return Ok(primary);
        }

        let legacy = self.renderer.legacy_contract_path(&vehicle.plate);
        if documents::locator_exists(&legacy).await {
            return Ok(legacy);
        }

        Err(ServiceError::NotFound(format!(
            "No contract document found for rental {}",
            rental.id
        )))
    }
}
