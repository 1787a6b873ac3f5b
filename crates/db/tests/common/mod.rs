//! Shared fixtures for repository integration tests.
//!
//! Tests run against PostgreSQL: the server named by `DATABASE_URL` when it is
//! set, otherwise a throwaway container. Each test creates and migrates its
//! own schema, so tests run in parallel against one server without seeing
//! each other's rows.

#![allow(dead_code)]

use std::env;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

use stockbook_core::counterparty::OpeningEntry;
use stockbook_core::inventory::ZeroStockPolicy;
use stockbook_core::trade::TradeLineInput;
use stockbook_db::entities::{counterparties, sea_orm_active_enums::CounterpartyRole};
use stockbook_db::migration::Migrator;
use stockbook_db::repositories::{
    CounterpartyRepository, CreateCounterpartyInput, InventoryRepository, TradeInput,
    TradeRepository,
};

/// Period used by every fixture trade.
pub const PERIOD: i32 = 2026;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub trades: TradeRepository,
    pub inventory: InventoryRepository,
    pub counterparties: CounterpartyRepository,
    _container: Option<ContainerAsync<Postgres>>,
}

pub async fn setup() -> TestContext {
    setup_with_policy(ZeroStockPolicy::Delete).await
}

pub async fn setup_with_policy(policy: ZeroStockPolicy) -> TestContext {
    let (url, container) = match env::var("DATABASE_URL") {
        Ok(url) => (url, None),
        Err(_) => {
            let container = Postgres::default()
                .start()
                .await
                .expect("Failed to start PostgreSQL container");
            let host = container.get_host().await.expect("Failed to get container host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("Failed to get container port");
            (
                format!("postgres://postgres:postgres@{host}:{port}/postgres"),
                Some(container),
            )
        }
    };

    let schema = format!("stockbook_test_{}", Uuid::new_v4().simple());
    let admin = Database::connect(url.as_str())
        .await
        .expect("Failed to connect to database");
    admin
        .execute_unprepared(&format!("CREATE SCHEMA {schema}"))
        .await
        .expect("Failed to create test schema");
    admin.close().await.expect("Failed to close admin connection");

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(10)
        .min_connections(1)
        .set_schema_search_path(schema)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to test schema");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    TestContext {
        trades: TradeRepository::new(db.clone(), policy),
        inventory: InventoryRepository::new(db.clone()),
        counterparties: CounterpartyRepository::new(db.clone()),
        db,
        _container: container,
    }
}

pub fn occurred_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(PERIOD, 3, 14, 10, 0, 0).unwrap()
}

pub fn line(product: &str, quantity: i64, unit_price: i64) -> TradeLineInput {
    TradeLineInput::new(product, Decimal::from(quantity), Decimal::from(unit_price))
}

pub fn trade(counterparty: &str, lines: Vec<TradeLineInput>) -> TradeInput {
    TradeInput {
        counterparty_name: counterparty.to_string(),
        lines,
        occurred_at: Some(occurred_at()),
    }
}

pub async fn counterparty(
    ctx: &TestContext,
    name: &str,
    role: CounterpartyRole,
) -> counterparties::Model {
    counterparty_with_opening(ctx, name, role, Vec::new()).await
}

pub async fn counterparty_with_opening(
    ctx: &TestContext,
    name: &str,
    role: CounterpartyRole,
    opening_entries: Vec<OpeningEntry>,
) -> counterparties::Model {
    ctx.counterparties
        .create(CreateCounterpartyInput {
            name: name.to_string(),
            role,
            phone: None,
            address: None,
            opening_entries,
        })
        .await
        .expect("Failed to create counterparty")
}

/// Stocks a product by recording a purchase from an untracked supplier.
pub async fn stock(ctx: &TestContext, product: &str, quantity: i64, unit_price: i64) {
    ctx.trades
        .create_purchase(trade("Opening stock", vec![line(product, quantity, unit_price)]))
        .await
        .expect("Failed to stock product");
}

pub async fn quantity(ctx: &TestContext, product: &str) -> Option<Decimal> {
    ctx.inventory
        .find_by_product(product, PERIOD)
        .await
        .expect("Failed to read inventory")
        .map(|r| r.quantity)
}

pub async fn balance(ctx: &TestContext, id: uuid::Uuid) -> Decimal {
    ctx.counterparties
        .find_by_id(id)
        .await
        .expect("Failed to read counterparty")
        .balance
}
