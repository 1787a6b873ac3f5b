//! Router test helpers: a migrated PostgreSQL schema per app and a one-shot
//! request runner.
//!
//! Uses the server named by `DATABASE_URL` when it is set, otherwise a
//! throwaway container.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router};
use stockbook_db::migration::Migrator;
use stockbook_shared::types::ZeroStockPolicy;

/// A router over its own schema. The container, if any, lives as long as
/// the app.
pub struct TestApp {
    router: Router,
    _container: Option<ContainerAsync<Postgres>>,
}

pub async fn test_app() -> TestApp {
    let (url, container) = match std::env::var("DATABASE_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let container = Postgres::default()
                .start()
                .await
                .expect("should start PostgreSQL container");
            let host = container.get_host().await.expect("should expose a host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("should expose port 5432");
            (
                format!("postgres://postgres:postgres@{host}:{port}/postgres"),
                Some(container),
            )
        }
    };

    let schema = format!("stockbook_api_test_{}", Uuid::new_v4().simple());
    let admin = Database::connect(url.as_str())
        .await
        .expect("should connect to database");
    admin
        .execute_unprepared(&format!("CREATE SCHEMA {schema}"))
        .await
        .expect("should create test schema");
    admin.close().await.expect("should close admin connection");

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(5)
        .min_connections(1)
        .set_schema_search_path(schema)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("should connect to test schema");
    Migrator::up(&db, None).await.expect("should run migrations");

    TestApp {
        router: create_router(AppState::new(db, ZeroStockPolicy::Delete)),
        _container: container,
    }
}

/// Sends one request and returns the status with the parsed JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Reads a decimal rendered as a JSON string.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
}
