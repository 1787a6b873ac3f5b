//! Inventory read routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stockbook_core::trade::TradeService;
use stockbook_db::entities::inventory_records;
use stockbook_db::repositories::inventory::total_value;
use stockbook_shared::AppError;

use crate::AppState;
use crate::error::error_response;

/// Creates the inventory routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route("/inventory/{product}", get(get_record))
}

/// Query parameters for inventory reads.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Calendar year. Defaults to the current one.
    pub period: Option<i32>,
}

impl PeriodQuery {
    fn period(&self) -> i32 {
        self.period
            .unwrap_or_else(|| TradeService::period_of(Utc::now()))
    }
}

/// Stock on hand for one product.
#[derive(Debug, Serialize)]
pub struct InventoryRecordResponse {
    /// Product name.
    pub product_name: String,
    /// Period.
    pub period: i32,
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Last unit price.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub total_value: Decimal,
    /// Last change.
    pub updated_at: String,
}

impl From<inventory_records::Model> for InventoryRecordResponse {
    fn from(record: inventory_records::Model) -> Self {
        Self {
            product_name: record.product_name,
            period: record.period,
            quantity: record.quantity,
            unit_price: record.unit_price,
            total_value: record.total_value,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// GET `/inventory?period=` - List the stock of a period.
async fn list_inventory(State(state): State<AppState>, Query(query): Query<PeriodQuery>) -> Response {
    let period = query.period();

    match state.inventory().list(period).await {
        Ok(records) => {
            let total = total_value(&records);
            let records: Vec<InventoryRecordResponse> =
                records.into_iter().map(InventoryRecordResponse::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "period": period,
                    "records": records,
                    "total_value": total,
                })),
            )
                .into_response()
        }
        Err(e) => error_response("DATABASE_ERROR", AppError::Database(e.to_string())),
    }
}

/// GET `/inventory/{product}?period=` - Stock of one product.
async fn get_record(
    State(state): State<AppState>,
    Path(product): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    match state.inventory().find_by_product(&product, query.period()).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(InventoryRecordResponse::from(record))).into_response()
        }
        Ok(None) => error_response(
            "INVENTORY_RECORD_NOT_FOUND",
            AppError::NotFound(format!("No stock of {product} in period {}", query.period())),
        ),
        Err(e) => error_response("DATABASE_ERROR", AppError::Database(e.to_string())),
    }
}
