use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoices are created exactly once, at rental close, and never mutated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Format `INV-YYYYMMDD-XXXXXXXX`; uniqueness is backed by a DB index,
    /// not by the randomness of the suffix.
    #[sea_orm(unique)]
    pub invoice_number: String,

    pub issue_date: NaiveDate,

    pub rental_id: Uuid,

    pub base_amount: Decimal,
    pub late_fee: Decimal,
    pub late_fee_description: Option<String>,
    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rental::Entity",
        from = "Column::RentalId",
        to = "super::rental::Column::Id"
    )]
    Rental,
}

impl Related<super::rental::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rental.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
