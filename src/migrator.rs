use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_vehicles_table::Migration),
            Box::new(m20240101_000002_create_rentals_table::Migration),
            Box::new(m20240101_000003_create_invoices_table::Migration),
            Box::new(m20240101_000004_create_maintenance_records_table::Migration),
            Box::new(m20240101_000005_create_vehicle_sales_table::Migration),
        ]
    }
}

mod m20240101_000001_create_vehicles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_vehicles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vehicles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vehicles::Brand).string().not_null())
                        .col(ColumnDef::new(Vehicles::Model).string().not_null())
                        .col(ColumnDef::new(Vehicles::Year).integer().not_null())
                        .col(ColumnDef::new(Vehicles::Plate).string().not_null())
                        .col(ColumnDef::new(Vehicles::DailyPrice).decimal().not_null())
                        .col(
                            ColumnDef::new(Vehicles::Mileage)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Vehicles::Status).string().not_null())
                        .col(ColumnDef::new(Vehicles::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Vehicles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicles_plate")
                        .table(Vehicles::Table)
                        .col(Vehicles::Plate)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicles_status")
                        .table(Vehicles::Table)
                        .col(Vehicles::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vehicles {
        Table,
        Id,
        Brand,
        Model,
        Year,
        Plate,
        DailyPrice,
        Mileage,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_rentals_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_rentals_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Rentals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Rentals::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Rentals::VehicleId).uuid().not_null())
                        .col(ColumnDef::new(Rentals::CustomerName).string().not_null())
                        .col(
                            ColumnDef::new(Rentals::CustomerNationalId)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Rentals::CustomerPhone).string().not_null())
                        .col(ColumnDef::new(Rentals::StartDate).date().not_null())
                        .col(ColumnDef::new(Rentals::EndDate).date().not_null())
                        .col(ColumnDef::new(Rentals::ReturnDate).date().null())
                        .col(
                            ColumnDef::new(Rentals::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Rentals::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rentals_vehicle_id")
                                .from(Rentals::Table, Rentals::VehicleId)
                                .to("vehicles", "id")
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_rentals_vehicle_active")
                        .table(Rentals::Table)
                        .col(Rentals::VehicleId)
                        .col(Rentals::Active)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Rentals::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Rentals {
        Table,
        Id,
        VehicleId,
        CustomerName,
        CustomerNationalId,
        CustomerPhone,
        StartDate,
        EndDate,
        ReturnDate,
        Active,
        CreatedAt,
    }
}

mod m20240101_000003_create_invoices_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null())
                        .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::RentalId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::BaseAmount).decimal().not_null())
                        .col(
                            ColumnDef::new(Invoices::LateFee)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::LateFeeDescription)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Invoices::TotalAmount).decimal().not_null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_rental_id")
                                .from(Invoices::Table, Invoices::RentalId)
                                .to("rentals", "id")
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // Random suffixes are not unique by construction; the index is.
            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_number")
                        .table(Invoices::Table)
                        .col(Invoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_invoices_rental")
                        .table(Invoices::Table)
                        .col(Invoices::RentalId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        IssueDate,
        RentalId,
        BaseAmount,
        LateFee,
        LateFeeDescription,
        TotalAmount,
        CreatedAt,
    }
}

mod m20240101_000004_create_maintenance_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_maintenance_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::VehicleId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::MaintenanceDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::NextMaintenanceDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::MaintenanceType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaintenanceRecords::Description).string().null())
                        .col(
                            ColumnDef::new(MaintenanceRecords::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRecords::ServiceCenter)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(MaintenanceRecords::Mileage).integer().null())
                        .col(ColumnDef::new(MaintenanceRecords::Status).string().not_null())
                        .col(
                            ColumnDef::new(MaintenanceRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_vehicle_id")
                                .from(MaintenanceRecords::Table, MaintenanceRecords::VehicleId)
                                .to("vehicles", "id")
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_maintenance_vehicle")
                        .table(MaintenanceRecords::Table)
                        .col(MaintenanceRecords::VehicleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_maintenance_next_date")
                        .table(MaintenanceRecords::Table)
                        .col(MaintenanceRecords::NextMaintenanceDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaintenanceRecords {
        Table,
        Id,
        VehicleId,
        MaintenanceDate,
        NextMaintenanceDate,
        MaintenanceType,
        Description,
        Cost,
        ServiceCenter,
        Mileage,
        Status,
        CreatedAt,
    }
}

mod m20240101_000005_create_vehicle_sales_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_vehicle_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VehicleSales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VehicleSales::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleSales::VehicleId).uuid().not_null())
                        .col(
                            ColumnDef::new(VehicleSales::CustomerName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleSales::CustomerNationalId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleSales::CustomerPhone)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VehicleSales::SaleDate).date().not_null())
                        .col(ColumnDef::new(VehicleSales::SalePrice).decimal().not_null())
                        .col(
                            ColumnDef::new(VehicleSales::PaymentMethod)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VehicleSales::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vehicle_sales_vehicle_id")
                                .from(VehicleSales::Table, VehicleSales::VehicleId)
                                .to("vehicles", "id")
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_vehicle_sales_vehicle")
                        .table(VehicleSales::Table)
                        .col(VehicleSales::VehicleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VehicleSales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VehicleSales {
        Table,
        Id,
        VehicleId,
        CustomerName,
        CustomerNationalId,
        CustomerPhone,
        SaleDate,
        SalePrice,
        PaymentMethod,
        CreatedAt,
    }
}
