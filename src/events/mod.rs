use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Events emitted after each successfully committed fleet operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    VehicleRegistered(Uuid),
    VehicleDeleted(Uuid),
    VehicleRented {
        vehicle_id: Uuid,
        rental_id: Uuid,
        end_date: NaiveDate,
    },
    VehicleReturned {
        vehicle_id: Uuid,
        rental_id: Uuid,
        invoice_number: String,
    },
    MaintenanceRecorded {
        vehicle_id: Uuid,
        record_id: Uuid,
    },
    MaintenanceStatusChanged {
        record_id: Uuid,
        new_status: String,
    },
    VehicleMarkedForSale(Uuid),
    VehicleRemovedFromSale(Uuid),
    VehicleSold {
        vehicle_id: Uuid,
        sale_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Background task draining the event channel. Events are advisory; a full
/// outbox/delivery pipeline is out of scope, so they are logged for audit.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::VehicleRented {
                vehicle_id,
                rental_id,
                end_date,
            } => info!(%vehicle_id, %rental_id, %end_date, "vehicle rented"),
            Event::VehicleReturned {
                vehicle_id,
                rental_id,
                invoice_number,
            } => info!(%vehicle_id, %rental_id, %invoice_number, "vehicle returned"),
            Event::VehicleSold {
                vehicle_id,
                sale_id,
            } => info!(%vehicle_id, %sale_id, "vehicle sold"),
            other => debug!(?other, "fleet event"),
        }
    }
    info!("Event processor stopped");
}
