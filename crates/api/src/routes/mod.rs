//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod counterparties;
pub mod health;
pub mod inventory;
pub mod trades;

#[cfg(test)]
mod test_support;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(trades::sale_routes())
        .merge(trades::purchase_routes())
        .merge(inventory::routes())
        .merge(counterparties::routes())
}
