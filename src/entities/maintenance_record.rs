use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    #[sea_orm(string_value = "PLANNED")]
    Planned,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Any of the three values is accepted at creation or update; there is
    /// no ordering enforcement between them.
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(Self::Planned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(ServiceError::InvalidInput(format!(
                "Unknown maintenance status: {other}. Valid values: PLANNED, IN_PROGRESS, COMPLETED"
            ))),
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    #[sea_orm(string_value = "ROUTINE")]
    Routine,
    #[sea_orm(string_value = "REPAIR")]
    Repair,
    #[sea_orm(string_value = "ACCIDENT")]
    Accident,
}

impl MaintenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "ROUTINE",
            Self::Repair => "REPAIR",
            Self::Accident => "ACCIDENT",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ROUTINE" => Ok(Self::Routine),
            "REPAIR" => Ok(Self::Repair),
            "ACCIDENT" => Ok(Self::Accident),
            other => Err(ServiceError::InvalidInput(format!(
                "Unknown maintenance type: {other}. Valid values: ROUTINE, REPAIR, ACCIDENT"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vehicle_id: Uuid,

    pub maintenance_date: DateTime<Utc>,
    pub next_maintenance_date: Option<DateTime<Utc>>,

    pub maintenance_type: MaintenanceType,
    pub description: Option<String>,
    pub cost: Decimal,
    pub service_center: Option<String>,
    pub mileage: Option<i32>,

    pub status: MaintenanceStatus,

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
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
