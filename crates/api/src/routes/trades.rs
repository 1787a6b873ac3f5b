//! Sale and purchase routes.
//!
//! `/sales` and `/purchases` share one set of handlers; the kind is bound
//! when the router is built.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::error_response;
use stockbook_core::trade::{TradeKind, TradeLineInput};
use stockbook_db::entities::{trade_lines, trades};
use stockbook_db::repositories::{TradeFilter, TradeInput, TradeWithLines};

/// Creates the `/sales` routes.
pub fn sale_routes() -> Router<AppState> {
    routes_for(TradeKind::Sale, "/sales")
}

/// Creates the `/purchases` routes.
pub fn purchase_routes() -> Router<AppState> {
    routes_for(TradeKind::Purchase, "/purchases")
}

fn routes_for(kind: TradeKind, base: &str) -> Router<AppState> {
    Router::new()
        .route(
            base,
            get(move |state: State<AppState>, query: Query<ListTradesQuery>| {
                list_trades(kind, state, query)
            })
            .post(move |state: State<AppState>, payload: Json<TradeRequest>| {
                create_trade(kind, state, payload)
            }),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(move |state: State<AppState>, id: Path<Uuid>| get_trade(kind, state, id))
                .put(
                    move |state: State<AppState>, id: Path<Uuid>, payload: Json<TradeRequest>| {
                        edit_trade(kind, state, id, payload)
                    },
                )
                .delete(move |state: State<AppState>, id: Path<Uuid>| {
                    delete_trade(kind, state, id)
                }),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing trades.
#[derive(Debug, Deserialize)]
pub struct ListTradesQuery {
    /// Filter by inventory period (calendar year).
    pub period: Option<i32>,
    /// Filter by resolved counterparty.
    pub counterparty_id: Option<Uuid>,
}

/// Request body for creating or editing a trade.
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    /// Counterparty name as entered.
    pub counterparty_name: String,
    /// Product lines.
    #[serde(default)]
    pub lines: Vec<TradeLineInput>,
    /// When the trade happened. Ignored on edit.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl From<TradeRequest> for TradeInput {
    fn from(request: TradeRequest) -> Self {
        Self {
            counterparty_name: request.counterparty_name,
            lines: request.lines,
            occurred_at: request.occurred_at,
        }
    }
}

/// A trade with its lines.
#[derive(Debug, Serialize)]
pub struct TradeResponse {
    /// Trade ID.
    pub id: Uuid,
    /// `sale` or `purchase`.
    pub kind: TradeKind,
    /// Counterparty name as entered.
    pub counterparty_name: String,
    /// Resolved counterparty, if any.
    pub counterparty_id: Option<Uuid>,
    /// When the trade happened.
    pub occurred_at: String,
    /// Inventory period.
    pub period: i32,
    /// Sum of line totals.
    pub total: Decimal,
    /// Lines in submission order.
    pub lines: Vec<LineResponse>,
}

/// A trade line.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// Product name.
    pub product_name: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub line_total: Decimal,
}

/// A trade in a listing (without lines).
#[derive(Debug, Serialize)]
pub struct TradeListItem {
    /// Trade ID.
    pub id: Uuid,
    /// Counterparty name as entered.
    pub counterparty_name: String,
    /// Resolved counterparty, if any.
    pub counterparty_id: Option<Uuid>,
    /// When the trade happened.
    pub occurred_at: String,
    /// Sum of line totals.
    pub total: Decimal,
}

impl From<TradeWithLines> for TradeResponse {
    fn from(value: TradeWithLines) -> Self {
        let TradeWithLines { trade, lines } = value;
        Self {
            id: trade.id,
            kind: trade.kind.into(),
            counterparty_name: trade.counterparty_name,
            counterparty_id: trade.counterparty_id,
            occurred_at: trade.occurred_at.to_rfc3339(),
            period: trade.period,
            total: trade.total,
            lines: lines.into_iter().map(LineResponse::from).collect(),
        }
    }
}

impl From<trade_lines::Model> for LineResponse {
    fn from(line: trade_lines::Model) -> Self {
        Self {
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
        }
    }
}

impl From<trades::Model> for TradeListItem {
    fn from(trade: trades::Model) -> Self {
        Self {
            id: trade.id,
            counterparty_name: trade.counterparty_name,
            counterparty_id: trade.counterparty_id,
            occurred_at: trade.occurred_at.to_rfc3339(),
            total: trade.total,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/sales`, `/purchases` - List trades, newest first.
async fn list_trades(
    kind: TradeKind,
    State(state): State<AppState>,
    Query(query): Query<ListTradesQuery>,
) -> Response {
    let filter = TradeFilter {
        kind: Some(kind),
        period: query.period,
        counterparty_id: query.counterparty_id,
    };

    match state.trades().list(filter).await {
        Ok(trades) => {
            let items: Vec<TradeListItem> = trades.into_iter().map(TradeListItem::from).collect();
            (StatusCode::OK, Json(json!({ "trades": items }))).into_response()
        }
        Err(e) => error_response(e.error_code(), e),
    }
}

/// POST `/sales`, `/purchases` - Record a trade.
async fn create_trade(
    kind: TradeKind,
    State(state): State<AppState>,
    Json(payload): Json<TradeRequest>,
) -> Response {
    match state.trades().create(kind, payload.into()).await {
        Ok(trade) => (StatusCode::CREATED, Json(TradeResponse::from(trade))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// GET `/sales/{id}`, `/purchases/{id}` - Get a trade with its lines.
async fn get_trade(kind: TradeKind, State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.trades().find_by_id(kind, id).await {
        Ok(trade) => (StatusCode::OK, Json(TradeResponse::from(trade))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// PUT `/sales/{id}`, `/purchases/{id}` - Replace the counterparty and lines.
async fn edit_trade(
    kind: TradeKind,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TradeRequest>,
) -> Response {
    match state.trades().edit(kind, id, payload.into()).await {
        Ok(trade) => (StatusCode::OK, Json(TradeResponse::from(trade))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// DELETE `/sales/{id}`, `/purchases/{id}` - Delete a trade and undo its effects.
async fn delete_trade(kind: TradeKind, State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.trades().delete(kind, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}
