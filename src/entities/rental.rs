use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rentals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vehicle_id: Uuid,

    pub customer_name: String,
    pub customer_national_id: String,
    pub customer_phone: String,

    pub start_date: NaiveDate,
    /// Planned return date, inclusive: both the start day and this day are billed.
    pub end_date: NaiveDate,
    /// Set once, when the vehicle is returned.
    pub return_date: Option<NaiveDate>,

    /// At most one active rental exists per vehicle at any time.
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Rental duration in billed days, counting both the start and end day.
    pub fn planned_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Display label used by the rental history view.
    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Active"
        } else if self.return_date.is_none() {
            "NotReturned"
        } else {
            "Completed"
        }
    }
}
