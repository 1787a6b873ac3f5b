//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for sales, purchases, inventory and counterparties
//! - Error rendering for the domain error types
//!
//! Handlers are thin: they parse the request, call one repository operation
//! and render the result. All reconciliation happens in `stockbook-db`.

pub mod error;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stockbook_db::{CounterpartyRepository, InventoryRepository, TradeRepository};
use stockbook_shared::types::ZeroStockPolicy;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// What happens to inventory records that reach zero.
    pub zero_stock_policy: ZeroStockPolicy,
}

impl AppState {
    /// Creates application state.
    #[must_use]
    pub fn new(db: DatabaseConnection, zero_stock_policy: ZeroStockPolicy) -> Self {
        Self {
            db: Arc::new(db),
            zero_stock_policy,
        }
    }

    pub(crate) fn trades(&self) -> TradeRepository {
        TradeRepository::new((*self.db).clone(), self.zero_stock_policy)
    }

    pub(crate) fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new((*self.db).clone())
    }

    pub(crate) fn counterparties(&self) -> CounterpartyRepository {
        CounterpartyRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
