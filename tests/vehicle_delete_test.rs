mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use fleet_api::{
    auth::roles,
    entities::{
        invoice::Entity as InvoiceEntity,
        maintenance_record::{Column as MaintenanceColumn, Entity as MaintenanceEntity},
        rental::{Column as RentalColumn, Entity as RentalEntity},
        vehicle::Entity as VehicleEntity,
        vehicle_sale::{Column as SaleColumn, Entity as SaleEntity},
    },
};

use common::TestApp;

#[tokio::test]
async fn deleting_a_vehicle_removes_every_dependent_record() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("99 DEL 001").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // Build up a full paper trail: two rental cycles (each with an
    // invoice), a maintenance record and a sale.
    let today = Utc::now().date_naive();
    for customer in ["Jane Doe", "John Roe"] {
        let rented = app
            .request(
                Method::POST,
                &format!("/api/v1/vehicles/{}/rent", vehicle.id),
                Some(json!({
                    "customer_name": customer,
                    "customer_national_id": "12345678901",
                    "customer_phone": "5551234567",
                    "end_date": today + Duration::days(2),
                })),
                Some(&employee),
            )
            .await;
        assert_eq!(rented.status(), StatusCode::CREATED);

        let returned = app
            .request(
                Method::POST,
                &format!("/api/v1/vehicles/{}/return", vehicle.id),
                None,
                Some(&employee),
            )
            .await;
        assert_eq!(returned.status(), StatusCode::OK);
    }

    let maintained = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(json!({
                "vehicle_id": vehicle.id,
                "maintenance_date": Utc::now(),
                "maintenance_type": "REPAIR",
                "description": "Brake pads",
                "cost": "1200",
                "status": "PLANNED",
            })),
            Some(&employee),
        )
        .await;
    assert_eq!(maintained.status(), StatusCode::CREATED);

    let sold = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}", vehicle.id),
            Some(json!({
                "customer_name": "Jane Doe",
                "customer_national_id": "12345678901",
                "customer_phone": "5551234567",
                "sale_price": "18000",
            })),
            Some(&employee),
        )
        .await;
    assert_eq!(sold.status(), StatusCode::CREATED);

    let db = app.state.db.as_ref();
    assert_eq!(
        RentalEntity::find()
            .filter(RentalColumn::VehicleId.eq(vehicle.id))
            .count(db)
            .await
            .expect("count rentals"),
        2
    );
    assert_eq!(
        InvoiceEntity::find().count(db).await.expect("count invoices"),
        2
    );
    assert_eq!(
        SaleEntity::find()
            .filter(SaleColumn::VehicleId.eq(vehicle.id))
            .count(db)
            .await
            .expect("count sales"),
        1
    );

    // Only admins may delete.
    let forbidden = app
        .request(
            Method::DELETE,
            &format!("/api/v1/vehicles/{}", vehicle.id),
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = app
        .request_admin(Method::DELETE, &format!("/api/v1/vehicles/{}", vehicle.id), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let db = app.state.db.as_ref();
    assert_eq!(
        VehicleEntity::find_by_id(vehicle.id)
            .count(db)
            .await
            .expect("count vehicles"),
        0
    );
    assert_eq!(
        RentalEntity::find()
            .filter(RentalColumn::VehicleId.eq(vehicle.id))
            .count(db)
            .await
            .expect("count rentals"),
        0
    );
    assert_eq!(
        InvoiceEntity::find().count(db).await.expect("count invoices"),
        0
    );
    assert_eq!(
        MaintenanceEntity::find()
            .filter(MaintenanceColumn::VehicleId.eq(vehicle.id))
            .count(db)
            .await
            .expect("count maintenance records"),
        0
    );
    assert_eq!(
        SaleEntity::find()
            .filter(SaleColumn::VehicleId.eq(vehicle.id))
            .count(db)
            .await
            .expect("count sales"),
        0
    );
}

#[tokio::test]
async fn deleting_an_unknown_vehicle_returns_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request_admin(
            Method::DELETE,
            &format!("/api/v1/vehicles/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
