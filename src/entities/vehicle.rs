use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;

/// The single source of truth for what operations may act on a vehicle.
/// Exactly one status holds at any instant; transition legality is
/// enforced by the services that drive each workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "RENTED")]
    Rented,
    #[sea_orm(string_value = "IN_MAINTENANCE")]
    InMaintenance,
    #[sea_orm(string_value = "DAMAGED")]
    Damaged,
    #[sea_orm(string_value = "FOR_SALE")]
    ForSale,
    #[sea_orm(string_value = "SOLD")]
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Rented => "RENTED",
            Self::InMaintenance => "IN_MAINTENANCE",
            Self::Damaged => "DAMAGED",
            Self::ForSale => "FOR_SALE",
            Self::Sold => "SOLD",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "RENTED" => Ok(Self::Rented),
            "IN_MAINTENANCE" => Ok(Self::InMaintenance),
            "DAMAGED" => Ok(Self::Damaged),
            "FOR_SALE" => Ok(Self::ForSale),
            "SOLD" => Ok(Self::Sold),
            other => Err(ServiceError::InvalidInput(format!(
                "Unknown vehicle status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Brand must not be blank"))]
    pub brand: String,

    #[validate(length(min = 1, max = 100, message = "Model must not be blank"))]
    pub model: String,

    pub year: i32,

    #[sea_orm(unique)]
    pub plate: String,

    pub daily_price: Decimal,

    pub mileage: i32,

    pub status: VehicleStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rental::Entity")]
    Rentals,
    #[sea_orm(has_many = "super::maintenance_record::Entity")]
    MaintenanceRecords,
    #[sea_orm(has_many = "super::vehicle_sale::Entity")]
    Sales,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rentals.def()
    }
}

impl Related<super::maintenance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRecords.def()
    }
}

impl Related<super::vehicle_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
