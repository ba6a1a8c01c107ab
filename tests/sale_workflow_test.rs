mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

use fleet_api::{
    auth::roles,
    entities::{
        vehicle::VehicleStatus,
        vehicle_sale::{Column as SaleColumn, Entity as SaleEntity},
    },
    services::vehicles,
};

use common::{body_json, TestApp};

fn sale_body() -> serde_json::Value {
    json!({
        "customer_name": "John Buyer",
        "customer_national_id": "98765432109",
        "customer_phone": "5559876543",
        "sale_price": "250000",
    })
}

#[tokio::test]
async fn eligibility_filters_by_age_mileage_and_status() {
    let app = TestApp::new().await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // Old and worn: eligible.
    let old = app
        .seed_vehicle("10 OLD 001", 2015, 180_000, VehicleStatus::Available)
        .await;
    // Too new.
    app.seed_vehicle("10 NEW 002", 2024, 180_000, VehicleStatus::Available)
        .await;
    // Not enough mileage.
    app.seed_vehicle("10 LOW 003", 2015, 20_000, VehicleStatus::Available)
        .await;
    // Already sold.
    app.seed_vehicle("10 SLD 004", 2015, 180_000, VehicleStatus::Sold)
        .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/sales/eligible?max_age_years=5&min_mileage=100000",
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let eligible = body_json(response).await;
    let eligible = eligible.as_array().expect("vehicle array");
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0]["id"], json!(old.id));
}

#[tokio::test]
async fn rented_vehicle_cannot_be_marked_for_sale() {
    let app = TestApp::new().await;
    let vehicle = app
        .seed_vehicle("10 RNT 005", 2015, 180_000, VehicleStatus::Rented)
        .await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}/mark-for-sale", vehicle.id),
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Rented
    );
}

#[tokio::test]
async fn selling_records_the_transaction_and_marks_the_vehicle_sold() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("10 SEL 006").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // Invalid national id fails fast and leaves the vehicle untouched.
    let mut bad = sale_body();
    bad["customer_national_id"] = json!("123");
    let rejected = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}", vehicle.id),
            Some(bad),
            Some(&employee),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Available
    );

    let sold = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}", vehicle.id),
            Some(sale_body()),
            Some(&employee),
        )
        .await;
    assert_eq!(sold.status(), StatusCode::CREATED);
    let sale = body_json(sold).await;
    // Payment method falls back to the unknown label when not supplied.
    assert_eq!(sale["payment_method"], json!("Unknown"));

    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Sold
    );

    let rows = SaleEntity::find()
        .filter(SaleColumn::VehicleId.eq(vehicle.id))
        .all(app.state.db.as_ref())
        .await
        .expect("load sales");
    assert_eq!(rows.len(), 1);

    // A sold vehicle cannot be sold twice.
    let again = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}", vehicle.id),
            Some(sale_body()),
            Some(&employee),
        )
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn remove_from_sale_requires_for_sale_status() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("10 RMV 007").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // Not on the sales list yet.
    let premature = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}/remove-from-sale", vehicle.id),
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(premature.status(), StatusCode::CONFLICT);

    let marked = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}/mark-for-sale", vehicle.id),
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(marked.status(), StatusCode::OK);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::ForSale
    );

    let removed = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/{}/remove-from-sale", vehicle.id),
            None,
            Some(&employee),
        )
        .await;
    assert_eq!(removed.status(), StatusCode::OK);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Available
    );
}
