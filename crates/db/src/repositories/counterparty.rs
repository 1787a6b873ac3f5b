//! Counterparty repository for clients, suppliers and their ledgers.
//!
//! Balances are never recomputed from scratch: every write adds the delta
//! decided by `LedgerService` in the same transaction as the row it belongs to.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::counterparty::{
    BalanceAudit, CounterpartyCandidate, CounterpartyService, LedgerAction, LedgerEntry,
    LedgerError, LedgerService, OpeningEntry,
};
use stockbook_core::trade::TradeLine;
use stockbook_shared::types::{CounterpartyId, LedgerEntryId, NoteId, PaymentId, TradeId};

use crate::entities::{
    counterparties, counterparty_ledger_entries, counterparty_notes, counterparty_payments,
    sea_orm_active_enums::CounterpartyRole, trades,
};

/// Input for creating a counterparty.
#[derive(Debug, Clone)]
pub struct CreateCounterpartyInput {
    /// Display name, unique per role.
    pub name: String,
    /// Client or supplier.
    pub role: CounterpartyRole,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Entries carried over from before the counterparty was tracked.
    pub opening_entries: Vec<OpeningEntry>,
}

/// Input for updating a counterparty. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCounterpartyInput {
    /// New name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Counterparty repository.
#[derive(Debug, Clone)]
pub struct CounterpartyRepository {
    db: DatabaseConnection,
}

impl CounterpartyRepository {
    /// Creates a new counterparty repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a counterparty with optional opening entries.
    ///
    /// The starting balance is derived from the opening entries once, here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is blank or an opening amount is negative
    /// - A counterparty with the same name and role exists
    /// - Database operation fails
    pub async fn create(
        &self,
        input: CreateCounterpartyInput,
    ) -> Result<counterparties::Model, LedgerError> {
        let name = CounterpartyService::validate_name(&input.name)?;
        let balance = LedgerService::opening_balance(&input.opening_entries)?;
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(db_err)?;

        let counterparty = counterparties::ActiveModel {
            id: Set(CounterpartyId::new().into_inner()),
            name: Set(name.clone()),
            role: Set(input.role),
            phone: Set(input.phone),
            address: Set(input.address),
            balance: Set(balance),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or_db(e, &name, input.role))?;

        for opening in &input.opening_entries {
            let occurred_at = opening.occurred_at.unwrap_or(now);
            counterparty_ledger_entries::ActiveModel {
                id: Set(LedgerEntryId::new().into_inner()),
                counterparty_id: Set(counterparty.id),
                kind: Set(opening.kind.into()),
                amount: Set(opening.amount),
                occurred_at: Set(occurred_at.into()),
                lines: Set(serde_json::Value::Array(Vec::new())),
                source_trade_id: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            counterparty_id = %counterparty.id,
            role = ?counterparty.role,
            balance = %counterparty.balance,
            "Counterparty created"
        );
        Ok(counterparty)
    }

    /// Gets a counterparty by ID.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CounterpartyNotFound` if it does not exist.
    pub async fn find_by_id(&self, id: Uuid) -> Result<counterparties::Model, LedgerError> {
        counterparties::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::CounterpartyNotFound(id))
    }

    /// Finds counterparties by exact name, any role.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<counterparties::Model>, LedgerError> {
        counterparties::Entity::find()
            .filter(counterparties::Column::Name.eq(name.trim()))
            .order_by_asc(counterparties::Column::Role)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists counterparties, optionally restricted to one role.
    pub async fn list(
        &self,
        role: Option<CounterpartyRole>,
    ) -> Result<Vec<counterparties::Model>, LedgerError> {
        let mut query = counterparties::Entity::find();
        if let Some(role) = role {
            query = query.filter(counterparties::Column::Role.eq(role));
        }
        query
            .order_by_asc(counterparties::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Updates contact details and/or the name.
    ///
    /// Renaming is safe: trades and ledger entries reference the ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the counterparty is missing, the new name is blank or
    /// taken, or the database operation fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCounterpartyInput,
    ) -> Result<counterparties::Model, LedgerError> {
        let existing = self.find_by_id(id).await?;
        let role = existing.role;
        let mut active: counterparties::ActiveModel = existing.into();

        let mut name = None;
        if let Some(new_name) = input.name {
            let validated = CounterpartyService::validate_name(&new_name)?;
            active.name = Set(validated.clone());
            name = Some(validated);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| match name {
            Some(name) => duplicate_or_db(e, &name, role),
            None => db_err(e),
        })
    }

    /// Deletes a counterparty with its ledger, payments and notes.
    ///
    /// Trades keep the name they were entered with; their counterparty link is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the counterparty is missing or the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        trades::Entity::update_many()
            .col_expr(trades::Column::CounterpartyId, Expr::value(Option::<Uuid>::None))
            .filter(trades::Column::CounterpartyId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        counterparty_ledger_entries::Entity::delete_many()
            .filter(counterparty_ledger_entries::Column::CounterpartyId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        counterparty_payments::Entity::delete_many()
            .filter(counterparty_payments::Column::CounterpartyId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        counterparty_notes::Entity::delete_many()
            .filter(counterparty_notes::Column::CounterpartyId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = counterparties::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::CounterpartyNotFound(id));
        }

        txn.commit().await.map_err(db_err)?;
        tracing::info!(counterparty_id = %id, "Counterparty deleted");
        Ok(())
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Records a payment and adds it to the balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the counterparty is
    /// missing, or the database operation fails.
    pub async fn record_payment(
        &self,
        id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<counterparty_payments::Model, LedgerError> {
        let delta = LedgerService::payment_delta(input.amount)?;
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(db_err)?;
        add_to_balance(&txn, CounterpartyId::from_uuid(id), delta).await?;

        let payment = counterparty_payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            counterparty_id: Set(id),
            amount: Set(input.amount),
            paid_at: Set(input.paid_at.unwrap_or(now).into()),
            memo: Set(input.memo),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(counterparty_id = %id, amount = %payment.amount, "Payment recorded");
        Ok(payment)
    }

    /// Lists payments, oldest first.
    pub async fn payments(&self, id: Uuid) -> Result<Vec<counterparty_payments::Model>, LedgerError> {
        counterparty_payments::Entity::find()
            .filter(counterparty_payments::Column::CounterpartyId.eq(id))
            .order_by_asc(counterparty_payments::Column::PaidAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Adds a free-text note.
    pub async fn add_note(
        &self,
        id: Uuid,
        text: &str,
    ) -> Result<counterparty_notes::Model, LedgerError> {
        let text = CounterpartyService::validate_note(text)?;
        self.find_by_id(id).await?;
        let now = Utc::now().into();

        counterparty_notes::ActiveModel {
            id: Set(NoteId::new().into_inner()),
            counterparty_id: Set(id),
            text: Set(text),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Replaces the text of a note.
    pub async fn edit_note(
        &self,
        id: Uuid,
        note_id: Uuid,
        text: &str,
    ) -> Result<counterparty_notes::Model, LedgerError> {
        let text = CounterpartyService::validate_note(text)?;
        let note = self.find_note(id, note_id).await?;

        let mut active: counterparty_notes::ActiveModel = note.into();
        active.text = Set(text);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Deletes a note.
    pub async fn delete_note(&self, id: Uuid, note_id: Uuid) -> Result<(), LedgerError> {
        let result = counterparty_notes::Entity::delete_by_id(note_id)
            .filter(counterparty_notes::Column::CounterpartyId.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::NoteNotFound(note_id));
        }
        Ok(())
    }

    /// Lists notes, oldest first.
    pub async fn notes(&self, id: Uuid) -> Result<Vec<counterparty_notes::Model>, LedgerError> {
        counterparty_notes::Entity::find()
            .filter(counterparty_notes::Column::CounterpartyId.eq(id))
            .order_by_asc(counterparty_notes::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_note(&self, id: Uuid, note_id: Uuid) -> Result<counterparty_notes::Model, LedgerError> {
        counterparty_notes::Entity::find_by_id(note_id)
            .filter(counterparty_notes::Column::CounterpartyId.eq(id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::NoteNotFound(note_id))
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    /// Lists live ledger entries, oldest first.
    pub async fn ledger_entries(&self, id: Uuid) -> Result<Vec<LedgerEntry>, LedgerError> {
        counterparty_ledger_entries::Entity::find()
            .filter(counterparty_ledger_entries::Column::CounterpartyId.eq(id))
            .order_by_asc(counterparty_ledger_entries::Column::OccurredAt)
            .order_by_asc(counterparty_ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(entry_from_model)
            .collect()
    }

    /// Compares the stored balance with the entries and payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the counterparty is missing or the database operation fails.
    pub async fn audit_balance(&self, id: Uuid) -> Result<BalanceAudit, LedgerError> {
        let counterparty = self.find_by_id(id).await?;
        let entries = self.ledger_entries(id).await?;
        let payments: Vec<Decimal> = self.payments(id).await?.into_iter().map(|p| p.amount).collect();

        let audit = LedgerService::audit(counterparty.balance, &entries, &payments);
        if !audit.is_consistent {
            tracing::warn!(counterparty_id = %id, drift = %audit.drift, "Balance drift detected");
        }
        Ok(audit)
    }
}

// ============================================================================
// Helpers shared with the trade repository
// ============================================================================

/// Loads name-resolution candidates for a trade.
pub(crate) async fn candidates_by_name<C>(
    conn: &C,
    name: &str,
) -> Result<Vec<CounterpartyCandidate>, LedgerError>
where
    C: ConnectionTrait,
{
    Ok(counterparties::Entity::find()
        .filter(counterparties::Column::Name.eq(name))
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|c| CounterpartyCandidate {
            id: CounterpartyId::from_uuid(c.id),
            name: c.name,
            role: c.role.into(),
        })
        .collect())
}

/// Finds the ledger entry linked to a trade, with its owner.
pub(crate) async fn entry_for_trade<C>(
    conn: &C,
    trade_id: TradeId,
) -> Result<Option<(CounterpartyId, LedgerEntry)>, LedgerError>
where
    C: ConnectionTrait,
{
    let Some(model) = counterparty_ledger_entries::Entity::find()
        .filter(counterparty_ledger_entries::Column::SourceTradeId.eq(trade_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)?
    else {
        return Ok(None);
    };

    let owner = CounterpartyId::from_uuid(model.counterparty_id);
    Ok(Some((owner, entry_from_model(model)?)))
}

/// Writes a ledger action and its balance delta.
pub(crate) async fn apply_ledger_action<C>(conn: &C, action: LedgerAction) -> Result<(), LedgerError>
where
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();

    match action {
        LedgerAction::Insert {
            counterparty_id,
            entry,
            balance_delta,
        } => {
            add_to_balance(conn, counterparty_id, balance_delta).await?;
            counterparty_ledger_entries::ActiveModel {
                id: Set(entry.id.into_inner()),
                counterparty_id: Set(counterparty_id.into_inner()),
                kind: Set(entry.kind.into()),
                amount: Set(entry.amount),
                occurred_at: Set(entry.occurred_at.into()),
                lines: Set(lines_to_json(&entry.lines)?),
                source_trade_id: Set(entry.source_trade_id.map(TradeId::into_inner)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(db_err)?;
            tracing::debug!(%counterparty_id, entry_id = %entry.id, %balance_delta, "Ledger entry appended");
        }
        LedgerAction::Overwrite {
            counterparty_id,
            entry,
            balance_delta,
        } => {
            add_to_balance(conn, counterparty_id, balance_delta).await?;
            counterparty_ledger_entries::Entity::update_many()
                .col_expr(counterparty_ledger_entries::Column::Amount, Expr::value(entry.amount))
                .col_expr(
                    counterparty_ledger_entries::Column::OccurredAt,
                    Expr::value(DateTimeWithTimeZone::from(entry.occurred_at)),
                )
                .col_expr(
                    counterparty_ledger_entries::Column::Lines,
                    Expr::value(lines_to_json(&entry.lines)?),
                )
                .col_expr(counterparty_ledger_entries::Column::UpdatedAt, Expr::value(now))
                .filter(counterparty_ledger_entries::Column::Id.eq(entry.id.into_inner()))
                .exec(conn)
                .await
                .map_err(db_err)?;
            tracing::debug!(%counterparty_id, entry_id = %entry.id, %balance_delta, "Ledger entry replaced");
        }
        LedgerAction::Remove {
            counterparty_id,
            entry_id,
            balance_delta,
        } => {
            add_to_balance(conn, counterparty_id, balance_delta).await?;
            counterparty_ledger_entries::Entity::delete_by_id(entry_id.into_inner())
                .exec(conn)
                .await
                .map_err(db_err)?;
            tracing::debug!(%counterparty_id, %entry_id, %balance_delta, "Ledger entry reversed");
        }
        LedgerAction::Skip => {}
    }

    Ok(())
}

/// Adds `delta` to a balance in a single statement.
async fn add_to_balance<C>(conn: &C, id: CounterpartyId, delta: Decimal) -> Result<(), LedgerError>
where
    C: ConnectionTrait,
{
    let result = counterparties::Entity::update_many()
        .col_expr(
            counterparties::Column::Balance,
            Expr::col(counterparties::Column::Balance).add(delta),
        )
        .col_expr(
            counterparties::Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(counterparties::Column::Id.eq(id.into_inner()))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(LedgerError::CounterpartyNotFound(id.into_inner()));
    }
    Ok(())
}

fn entry_from_model(model: counterparty_ledger_entries::Model) -> Result<LedgerEntry, LedgerError> {
    let lines: Vec<TradeLine> =
        serde_json::from_value(model.lines).map_err(|e| LedgerError::Database(e.to_string()))?;

    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        kind: model.kind.into(),
        amount: model.amount,
        occurred_at: model.occurred_at.with_timezone(&Utc),
        lines,
        source_trade_id: model.source_trade_id.map(TradeId::from_uuid),
    })
}

fn lines_to_json(lines: &[TradeLine]) -> Result<serde_json::Value, LedgerError> {
    serde_json::to_value(lines).map_err(|e| LedgerError::Database(e.to_string()))
}

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

fn duplicate_or_db(e: DbErr, name: &str, role: CounterpartyRole) -> LedgerError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        let role: stockbook_core::counterparty::CounterpartyRole = role.into();
        return LedgerError::DuplicateCounterparty {
            name: name.to_string(),
            role: role.to_string(),
        };
    }
    db_err(e)
}
