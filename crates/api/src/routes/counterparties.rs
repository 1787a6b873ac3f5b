//! Client and supplier routes: records, ledger, payments and notes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::AppState;
use crate::error::{bad_request, error_response};
use stockbook_core::counterparty::{CounterpartyRole, OpeningEntry};
use stockbook_db::entities::{counterparties, counterparty_notes, counterparty_payments};
use stockbook_db::repositories::{
    CreateCounterpartyInput, RecordPaymentInput, UpdateCounterpartyInput,
};

/// Creates the counterparty routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/counterparties", get(list_counterparties).post(create_counterparty))
        .route(
            "/counterparties/{id}",
            get(get_counterparty)
                .patch(update_counterparty)
                .delete(delete_counterparty),
        )
        .route("/counterparties/{id}/ledger", get(get_ledger))
        .route("/counterparties/{id}/audit", get(audit_balance))
        .route(
            "/counterparties/{id}/payments",
            get(list_payments).post(record_payment),
        )
        .route("/counterparties/{id}/notes", post(add_note).get(list_notes))
        .route(
            "/counterparties/{id}/notes/{note_id}",
            put(edit_note).delete(delete_note),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing counterparties.
#[derive(Debug, Deserialize)]
pub struct ListCounterpartiesQuery {
    /// `client` or `supplier`.
    pub role: Option<String>,
}

/// Request body for creating a counterparty.
#[derive(Debug, Deserialize)]
pub struct CreateCounterpartyRequest {
    /// Display name.
    pub name: String,
    /// `client` or `supplier`.
    pub role: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Balance carried over from before the counterparty was tracked.
    #[serde(default)]
    pub opening_entries: Vec<OpeningEntry>,
}

/// Request body for updating a counterparty.
#[derive(Debug, Deserialize)]
pub struct UpdateCounterpartyRequest {
    /// New name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Memo.
    pub memo: Option<String>,
}

/// Request body for adding or editing a note.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    /// Note text.
    pub text: String,
}

/// Response for a counterparty.
#[derive(Debug, Serialize)]
pub struct CounterpartyResponse {
    /// Counterparty ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// `client` or `supplier`.
    pub role: CounterpartyRole,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Running balance.
    pub balance: Decimal,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<counterparties::Model> for CounterpartyResponse {
    fn from(c: counterparties::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            role: c.role.into(),
            phone: c.phone,
            address: c.address,
            balance: c.balance,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// When the payment was made.
    pub paid_at: String,
    /// Memo.
    pub memo: Option<String>,
}

impl From<counterparty_payments::Model> for PaymentResponse {
    fn from(p: counterparty_payments::Model) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            paid_at: p.paid_at.to_rfc3339(),
            memo: p.memo,
        }
    }
}

/// Response for a note.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    /// Note ID.
    pub id: Uuid,
    /// Text.
    pub text: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<counterparty_notes::Model> for NoteResponse {
    fn from(n: counterparty_notes::Model) -> Self {
        Self {
            id: n.id,
            text: n.text,
            created_at: n.created_at.to_rfc3339(),
            updated_at: n.updated_at.to_rfc3339(),
        }
    }
}

fn parse_role(role: &str) -> Result<CounterpartyRole, Response> {
    CounterpartyRole::from_str(role).map_err(|message| bad_request("INVALID_ROLE", message))
}

// ============================================================================
// Counterparty Handlers
// ============================================================================

/// GET `/counterparties` - List counterparties, optionally by role.
async fn list_counterparties(
    State(state): State<AppState>,
    Query(query): Query<ListCounterpartiesQuery>,
) -> Response {
    let role = match query.role.as_deref().map(parse_role).transpose() {
        Ok(role) => role,
        Err(response) => return response,
    };

    match state.counterparties().list(role.map(Into::into)).await {
        Ok(list) => {
            let items: Vec<CounterpartyResponse> =
                list.into_iter().map(CounterpartyResponse::from).collect();
            (StatusCode::OK, Json(json!({ "counterparties": items }))).into_response()
        }
        Err(e) => error_response(e.error_code(), e),
    }
}

/// POST `/counterparties` - Create a counterparty with optional opening entries.
async fn create_counterparty(
    State(state): State<AppState>,
    Json(payload): Json<CreateCounterpartyRequest>,
) -> Response {
    let role = match parse_role(&payload.role) {
        Ok(role) => role,
        Err(response) => return response,
    };

    let input = CreateCounterpartyInput {
        name: payload.name,
        role: role.into(),
        phone: payload.phone,
        address: payload.address,
        opening_entries: payload.opening_entries,
    };

    match state.counterparties().create(input).await {
        Ok(c) => (StatusCode::CREATED, Json(CounterpartyResponse::from(c))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// GET `/counterparties/{id}` - Get a counterparty.
async fn get_counterparty(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.counterparties().find_by_id(id).await {
        Ok(c) => (StatusCode::OK, Json(CounterpartyResponse::from(c))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// PATCH `/counterparties/{id}` - Rename or update contact details.
async fn update_counterparty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCounterpartyRequest>,
) -> Response {
    let input = UpdateCounterpartyInput {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
    };

    match state.counterparties().update(id, input).await {
        Ok(c) => (StatusCode::OK, Json(CounterpartyResponse::from(c))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// DELETE `/counterparties/{id}` - Delete a counterparty and its ledger.
async fn delete_counterparty(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.counterparties().delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

// ============================================================================
// Ledger Handlers
// ============================================================================

/// GET `/counterparties/{id}/ledger` - Balance and live entries.
async fn get_ledger(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = state.counterparties();

    let counterparty = match repo.find_by_id(id).await {
        Ok(c) => c,
        Err(e) => return error_response(e.error_code(), e),
    };

    match repo.ledger_entries(id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({
                "counterparty_id": counterparty.id,
                "balance": counterparty.balance,
                "entries": entries,
            })),
        )
            .into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// GET `/counterparties/{id}/audit` - Compare the balance with the ledger.
async fn audit_balance(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.counterparties().audit_balance(id).await {
        Ok(audit) => (StatusCode::OK, Json(audit)).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// POST `/counterparties/{id}/payments` - Record a payment.
async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Response {
    let input = RecordPaymentInput {
        amount: payload.amount,
        paid_at: payload.paid_at,
        memo: payload.memo,
    };

    match state.counterparties().record_payment(id, input).await {
        Ok(p) => (StatusCode::CREATED, Json(PaymentResponse::from(p))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// GET `/counterparties/{id}/payments` - List payments.
async fn list_payments(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.counterparties().payments(id).await {
        Ok(payments) => {
            let items: Vec<PaymentResponse> = payments.into_iter().map(PaymentResponse::from).collect();
            (StatusCode::OK, Json(json!({ "payments": items }))).into_response()
        }
        Err(e) => error_response(e.error_code(), e),
    }
}

// ============================================================================
// Note Handlers
// ============================================================================

/// POST `/counterparties/{id}/notes` - Add a note.
async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NoteRequest>,
) -> Response {
    match state.counterparties().add_note(id, &payload.text).await {
        Ok(n) => (StatusCode::CREATED, Json(NoteResponse::from(n))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// GET `/counterparties/{id}/notes` - List notes.
async fn list_notes(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.counterparties().notes(id).await {
        Ok(notes) => {
            let items: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
            (StatusCode::OK, Json(json!({ "notes": items }))).into_response()
        }
        Err(e) => error_response(e.error_code(), e),
    }
}

/// PUT `/counterparties/{id}/notes/{note_id}` - Replace a note's text.
async fn edit_note(
    State(state): State<AppState>,
    Path((id, note_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<NoteRequest>,
) -> Response {
    match state.counterparties().edit_note(id, note_id, &payload.text).await {
        Ok(n) => (StatusCode::OK, Json(NoteResponse::from(n))).into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}

/// DELETE `/counterparties/{id}/notes/{note_id}` - Delete a note.
async fn delete_note(
    State(state): State<AppState>,
    Path((id, note_id)): Path<(Uuid, Uuid)>,
) -> Response {
    match state.counterparties().delete_note(id, note_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.error_code(), e),
    }
}
