use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Everything the contract document needs; assembled by the rental service
/// so the renderer stays free of persistence concerns.
#[derive(Debug, Clone)]
pub struct RentalContractData {
    pub rental_id: Uuid,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub daily_price: Decimal,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RentalContractData {
    pub fn planned_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn estimated_total(&self) -> Decimal {
        self.daily_price * Decimal::from(self.planned_days())
    }
}

/// Produces the human-readable contract artifact for a rental. A failure
/// here must abort the enclosing rental transaction.
#[async_trait]
pub trait ContractRenderer: Send + Sync {
    async fn render(&self, data: &RentalContractData) -> Result<PathBuf, ServiceError>;

    /// Locator for a rental's contract document.
    fn contract_path(&self, rental_id: Uuid) -> PathBuf;

    /// Legacy locator keyed by plate, kept for documents produced before
    /// rental-id-based naming.
    fn legacy_contract_path(&self, plate: &str) -> PathBuf;
}

/// Writes plain-text contracts under a configured directory.
pub struct FsContractRenderer {
    contracts_dir: PathBuf,
}

impl FsContractRenderer {
    pub fn new(contracts_dir: impl Into<PathBuf>) -> Self {
        Self {
            contracts_dir: contracts_dir.into(),
        }
    }

    fn render_body(data: &RentalContractData) -> String {
        let mut body = String::new();
        body.push_str("VEHICLE RENTAL CONTRACT\n");
        body.push_str("=======================\n\n");
        body.push_str("LESSOR: Fleet Rentals Inc.\n");
        body.push_str(&format!("LESSEE: {}\n\n", data.customer_name));

        body.push_str("VEHICLE\n");
        body.push_str(&format!("  Plate:        {}\n", data.plate));
        body.push_str(&format!("  Brand/Model:  {} {}\n", data.brand, data.model));
        body.push_str(&format!("  Model year:   {}\n", data.year));
        body.push_str(&format!("  Daily price:  {}\n\n", data.daily_price));

        body.push_str("RENTAL TERMS\n");
        body.push_str(&format!("  Start date:       {}\n", data.start_date));
        body.push_str(&format!("  Planned return:   {}\n", data.end_date));
        body.push_str(&format!("  Duration:         {} day(s)\n", data.planned_days()));
        body.push_str(&format!(
            "  Estimated total:  {}\n\n",
            data.estimated_total()
        ));

        body.push_str("CONDITIONS\n");
        body.push_str("  1. The vehicle is delivered and returned on the agreed dates.\n");
        body.push_str("  2. The lessee is liable for traffic violations during the rental.\n");
        body.push_str("  3. Late return incurs a penalty of 150% of the daily price per day.\n");
        body.push_str("  4. The vehicle is returned at the original fuel level.\n\n");

        body.push_str(&format!(
            "Contract no: CONT-{} | Issued: {}\n",
            data.rental_id,
            chrono::Local::now().date_naive()
        ));
        body
    }
}

#[async_trait]
impl ContractRenderer for FsContractRenderer {
    async fn render(&self, data: &RentalContractData) -> Result<PathBuf, ServiceError> {
        tokio::fs::create_dir_all(&self.contracts_dir)
            .await
            .map_err(|e| {
                ServiceError::DocumentError(format!("Cannot create contracts directory: {}", e))
            })?;

        let path = self.contract_path(data.rental_id);
        let body = Self::render_body(data);

        tokio::fs::write(&path, body).await.map_err(|e| {
            ServiceError::DocumentError(format!(
                "Cannot write contract {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(rental_id = %data.rental_id, path = %path.display(), "contract rendered");
        Ok(path)
    }

    fn contract_path(&self, rental_id: Uuid) -> PathBuf {
        self.contracts_dir.join(format!("contract-{}.txt", rental_id))
    }

    fn legacy_contract_path(&self, plate: &str) -> PathBuf {
        let normalized: String = plate.split_whitespace().collect();
        self.contracts_dir
            .join(format!("contract-{}.txt", normalized))
    }
}

/// True when the locator points at an existing artifact.
pub async fn locator_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
