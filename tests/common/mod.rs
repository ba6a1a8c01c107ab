#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware,
    routing::get,
    Router,
};
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use fleet_api::{
    auth::{auth_middleware, roles, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::vehicle::{self, VehicleStatus},
    events::{self, EventSender},
    AppState,
};

/// Spins up the full router against a throwaway SQLite database and a
/// temporary contracts directory.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    auth_service: Arc<AuthService>,
    admin_token: String,
    _work_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let work_dir = TempDir::new().expect("create temp dir for test app");
        let db_path = work_dir.path().join("fleet_test.db");
        let contracts_dir = work_dir.path().join("contracts");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_expiration,
        )));

        let state = Arc::new(AppState::build(db_arc, event_sender, contracts_dir.clone()));

        let auth_service_for_layer = auth_service.clone();
        let api_router = fleet_api::api_v1_routes()
            .layer(middleware::from_fn(auth_middleware))
            .layer(middleware::from_fn_with_state(
                auth_service_for_layer,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ));

        let router = Router::new()
            .route("/health", get(|| async { "up" }))
            .nest("/api/v1", api_router)
            .with_state(state.clone());

        let admin_token = auth_service
            .issue_token(
                &Uuid::new_v4().to_string(),
                Some("Test Admin".to_string()),
                vec![roles::ADMIN.to_string()],
            )
            .expect("issue admin token");

        Self {
            router,
            state,
            auth_service,
            admin_token,
            _work_dir: work_dir,
            _event_task: event_task,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn token_with_roles(&self, token_roles: &[&str]) -> String {
        self.auth_service
            .issue_token(
                &Uuid::new_v4().to_string(),
                Some("Test User".to_string()),
                token_roles.iter().map(|r| r.to_string()).collect(),
            )
            .expect("issue token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for admin-authenticated JSON requests.
    pub async fn request_admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.admin_token()))
            .await
    }

    /// Insert a vehicle directly, bypassing the API, so tests can start
    /// from any status, age or mileage.
    pub async fn seed_vehicle(
        &self,
        plate: &str,
        year: i32,
        mileage: i32,
        status: VehicleStatus,
    ) -> vehicle::Model {
        let model = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand: Set("Toyota".to_string()),
            model: Set("Corolla".to_string()),
            year: Set(year),
            plate: Set(plate.to_string()),
            daily_price: Set(dec!(100)),
            mileage: Set(mileage),
            status: Set(status),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        model
            .insert(self.state.db.as_ref())
            .await
            .expect("seed vehicle")
    }

    pub async fn seed_available_vehicle(&self, plate: &str) -> vehicle::Model {
        self.seed_vehicle(plate, 2022, 30_000, VehicleStatus::Available)
            .await
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body as json")
}
