pub mod invoice;
pub mod maintenance_record;
pub mod rental;
pub mod vehicle;
pub mod vehicle_sale;
