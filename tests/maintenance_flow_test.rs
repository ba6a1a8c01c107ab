mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use fleet_api::{auth::roles, entities::vehicle::VehicleStatus, services::vehicles};

use common::{body_json, TestApp};

fn record_body(vehicle_id: uuid::Uuid, status: &str) -> serde_json::Value {
    json!({
        "vehicle_id": vehicle_id,
        "maintenance_date": Utc::now(),
        "next_maintenance_date": null,
        "maintenance_type": "ROUTINE",
        "description": "Oil change",
        "cost": "250",
        "service_center": "Main garage",
        "mileage": 52000,
        "status": status,
    })
}

#[tokio::test]
async fn in_progress_record_pulls_vehicle_into_maintenance() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 100").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // A planned record does not change the vehicle.
    let planned = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "PLANNED")),
            Some(&employee),
        )
        .await;
    assert_eq!(planned.status(), StatusCode::CREATED);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Available
    );

    let in_progress = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "IN_PROGRESS")),
            Some(&employee),
        )
        .await;
    assert_eq!(in_progress.status(), StatusCode::CREATED);
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::InMaintenance
    );
}

#[tokio::test]
async fn rented_vehicle_cannot_enter_maintenance() {
    let app = TestApp::new().await;
    let vehicle = app
        .seed_vehicle("01 MNT 200", 2022, 30_000, VehicleStatus::Rented)
        .await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "IN_PROGRESS")),
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
async fn completing_the_in_progress_record_releases_the_vehicle_despite_planned_work() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 300").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // One record in progress, one merely planned.
    let in_progress = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "IN_PROGRESS")),
            Some(&employee),
        )
        .await;
    let in_progress = body_json(in_progress).await;
    let record_id = in_progress["id"].as_str().expect("record id").to_string();

    let planned = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "PLANNED")),
            Some(&employee),
        )
        .await;
    assert_eq!(planned.status(), StatusCode::CREATED);

    // Completing the in-progress record leaves only the planned one, so the
    // vehicle is released even though not every record is completed.
    let updated = app
        .request(
            Method::PATCH,
            &format!("/api/v1/maintenance/{}/status", record_id),
            Some(json!({ "status": "COMPLETED" })),
            Some(&employee),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Available
    );
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 400").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "SCHEDULED")),
            Some(&employee),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn record_details_can_be_edited_in_place() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 700").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    let created = app
        .request(
            Method::POST,
            "/api/v1/maintenance",
            Some(record_body(vehicle.id, "PLANNED")),
            Some(&employee),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    let record_id = created["id"].as_str().expect("record id").to_string();

    let mut edit = record_body(vehicle.id, "PLANNED");
    edit["maintenance_type"] = json!("REPAIR");
    edit["description"] = json!("Timing belt");
    edit["cost"] = json!("900");
    let updated = app
        .request(
            Method::PUT,
            &format!("/api/v1/maintenance/{}", record_id),
            Some(edit),
            Some(&employee),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["maintenance_type"], json!("REPAIR"));
    assert_eq!(updated["description"], json!("Timing belt"));
    assert_eq!(updated["cost"], json!("900"));

    // Editing details never moves the vehicle status.
    assert_eq!(
        vehicles::get_status(app.state.db.as_ref(), vehicle.id)
            .await
            .expect("read status"),
        VehicleStatus::Available
    );

    let missing = app
        .request(
            Method::PUT,
            &format!("/api/v1/maintenance/{}", uuid::Uuid::new_v4()),
            Some(record_body(vehicle.id, "PLANNED")),
            Some(&employee),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upcoming_lists_records_due_within_two_weeks() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 500").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    let mut soon = record_body(vehicle.id, "PLANNED");
    soon["next_maintenance_date"] = json!(Utc::now() + Duration::days(7));
    let mut far = record_body(vehicle.id, "PLANNED");
    far["next_maintenance_date"] = json!(Utc::now() + Duration::days(30));

    for body in [soon, far] {
        let response = app
            .request(Method::POST, "/api/v1/maintenance", Some(body), Some(&employee))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let upcoming = app
        .request(Method::GET, "/api/v1/maintenance/upcoming", None, Some(&employee))
        .await;
    assert_eq!(upcoming.status(), StatusCode::OK);
    let records = body_json(upcoming).await;
    assert_eq!(records.as_array().expect("records array").len(), 1);
}

#[tokio::test]
async fn upcoming_window_includes_both_boundary_days() {
    let app = TestApp::new().await;
    let vehicle = app.seed_available_vehicle("01 MNT 600").await;
    let employee = app.token_with_roles(&[roles::EMPLOYEE]);

    // Due dates straddling each edge of the two-week window.
    let cases = [
        ("due now", Utc::now() + Duration::seconds(30)),
        ("already past", Utc::now() - Duration::hours(1)),
        ("day fourteen", Utc::now() + Duration::days(14)),
        ("day fifteen", Utc::now() + Duration::days(15)),
    ];
    for (label, due) in &cases {
        let mut body = record_body(vehicle.id, "PLANNED");
        body["description"] = json!(label);
        body["next_maintenance_date"] = json!(due);
        let response = app
            .request(Method::POST, "/api/v1/maintenance", Some(body), Some(&employee))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let upcoming = app
        .request(Method::GET, "/api/v1/maintenance/upcoming", None, Some(&employee))
        .await;
    assert_eq!(upcoming.status(), StatusCode::OK);
    let records = body_json(upcoming).await;
    let listed: Vec<&str> = records
        .as_array()
        .expect("records array")
        .iter()
        .map(|r| r["description"].as_str().expect("description"))
        .collect();
    assert_eq!(listed, ["due now", "day fourteen"]);
}
