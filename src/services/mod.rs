pub mod documents;
pub mod invoicing;
pub mod maintenance;
pub mod rentals;
pub mod sales;
pub mod vehicles;

pub use documents::{ContractRenderer, FsContractRenderer};
pub use maintenance::MaintenanceService;
pub use rentals::RentalService;
pub use sales::SaleService;
pub use vehicles::VehicleService;
