//! Trade repository: the sale and purchase mutation orchestrator.
//!
//! Every create, edit and delete runs in one database transaction. Inventory
//! is adjusted first (locked rows, compare-and-set writes), then the trade
//! record, then the counterparty ledger. Any failure rolls all of it back.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use stockbook_core::counterparty::{CounterpartyService, LedgerAction, LedgerService};
use stockbook_core::inventory::ZeroStockPolicy;
use stockbook_core::trade::{TradeError, TradeKind, TradeLine, TradeLineInput, TradeService};
use stockbook_shared::types::{CounterpartyId, TradeId, TradeLineId};

use crate::entities::{sea_orm_active_enums::TradeKind as DbTradeKind, trade_lines, trades};

use super::counterparty::{apply_ledger_action, candidates_by_name, entry_for_trade};
use super::inventory::apply_adjustments;

/// Input for creating or editing a sale or purchase.
#[derive(Debug, Clone)]
pub struct TradeInput {
    /// Counterparty name as entered.
    pub counterparty_name: String,
    /// Product lines.
    pub lines: Vec<TradeLineInput>,
    /// When the trade happened. Defaults to now on create; ignored on edit.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Filter options for listing trades.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    /// Filter by kind.
    pub kind: Option<TradeKind>,
    /// Filter by inventory period.
    pub period: Option<i32>,
    /// Filter by resolved counterparty.
    pub counterparty_id: Option<Uuid>,
}

/// Trade with its lines.
#[derive(Debug, Clone)]
pub struct TradeWithLines {
    /// Trade header.
    pub trade: trades::Model,
    /// Lines in submission order.
    pub lines: Vec<trade_lines::Model>,
}

/// Sale and purchase repository.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    db: DatabaseConnection,
    zero_stock_policy: ZeroStockPolicy,
}

impl TradeRepository {
    /// Creates a new trade repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, zero_stock_policy: ZeroStockPolicy) -> Self {
        Self {
            db,
            zero_stock_policy,
        }
    }

    /// Creates a sale or purchase.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Lines or the counterparty name fail validation
    /// - A sale line exceeds the stock on hand (`InsufficientStock`)
    /// - A concurrent request changed the same stock first
    /// - Database operation fails
    pub async fn create(&self, kind: TradeKind, input: TradeInput) -> Result<TradeWithLines, TradeError> {
        let counterparty_name = TradeService::validate_counterparty_name(&input.counterparty_name)?;
        let lines = TradeService::validate_and_price(&input.lines)?;
        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let period = TradeService::period_of(occurred_at);
        let trade_id = TradeId::new();

        let txn = self.db.begin().await.map_err(db_err)?;

        let counterparty_id = resolve_counterparty(&txn, &counterparty_name, kind).await?;

        apply_adjustments(
            &txn,
            period,
            &TradeService::create_adjustments(kind, &lines),
            self.zero_stock_policy,
        )
        .await?;

        let now = Utc::now();
        let trade = trades::ActiveModel {
            id: Set(trade_id.into_inner()),
            kind: Set(kind.into()),
            counterparty_name: Set(counterparty_name),
            counterparty_id: Set(counterparty_id.map(CounterpartyId::into_inner)),
            occurred_at: Set(occurred_at.into()),
            period: Set(period),
            total: Set(TradeService::total(&lines)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;
        let line_models = insert_lines(&txn, trade_id, &lines).await?;

        let action = LedgerService::append(
            counterparty_id,
            TradeService::ledger_draft(kind, trade_id, occurred_at, &lines),
        )?;
        apply_ledger_action(&txn, action).await?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            %trade_id,
            %kind,
            counterparty_id = ?counterparty_id,
            total = %trade.total,
            "Trade created"
        );
        Ok(TradeWithLines {
            trade,
            lines: line_models,
        })
    }

    /// Replaces the counterparty and lines of a sale or purchase.
    ///
    /// Inventory moves by the net difference between the old and new lines. The
    /// ledger entry is overwritten in place when the counterparty is unchanged;
    /// otherwise it is reversed on the old counterparty and appended on the new.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The trade does not exist or is of the other kind
    /// - Validation fails
    /// - The net change would drive stock negative
    /// - Database operation fails
    pub async fn edit(
        &self,
        kind: TradeKind,
        id: Uuid,
        input: TradeInput,
    ) -> Result<TradeWithLines, TradeError> {
        let counterparty_name = TradeService::validate_counterparty_name(&input.counterparty_name)?;
        let new_lines = TradeService::validate_and_price(&input.lines)?;
        let trade_id = TradeId::from_uuid(id);

        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = lock_trade(&txn, kind, id).await?;
        let old_lines = load_lines(&txn, id).await?;
        let occurred_at = existing.occurred_at.with_timezone(&Utc);
        let period = existing.period;

        let counterparty_id = resolve_counterparty(&txn, &counterparty_name, kind).await?;

        apply_adjustments(
            &txn,
            period,
            &TradeService::edit_adjustments(kind, &to_core_lines(&old_lines), &new_lines),
            self.zero_stock_policy,
        )
        .await?;

        let mut active: trades::ActiveModel = existing.into();
        active.counterparty_name = Set(counterparty_name);
        active.counterparty_id = Set(counterparty_id.map(CounterpartyId::into_inner));
        active.total = Set(TradeService::total(&new_lines));
        active.updated_at = Set(Utc::now().into());
        let trade = active.update(&txn).await.map_err(db_err)?;

        trade_lines::Entity::delete_many()
            .filter(trade_lines::Column::TradeId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let line_models = insert_lines(&txn, trade_id, &new_lines).await?;

        let draft = TradeService::ledger_draft(kind, trade_id, occurred_at, &new_lines);
        match entry_for_trade(&txn, trade_id).await? {
            Some((owner, entry)) if Some(owner) == counterparty_id => {
                let action = LedgerService::replace(counterparty_id, Some(&entry), draft)?;
                apply_ledger_action(&txn, action).await?;
            }
            Some((owner, entry)) => {
                apply_ledger_action(&txn, LedgerService::reverse(Some(owner), Some(&entry))).await?;
                apply_ledger_action(&txn, LedgerService::append(counterparty_id, draft)?).await?;
            }
            None => {
                apply_ledger_action(&txn, LedgerService::append(counterparty_id, draft)?).await?;
            }
        }

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            %trade_id,
            %kind,
            counterparty_id = ?counterparty_id,
            total = %trade.total,
            "Trade edited"
        );
        Ok(TradeWithLines {
            trade,
            lines: line_models,
        })
    }

    /// Deletes a sale or purchase, undoing its stock and ledger effects.
    ///
    /// Deleting a purchase whose goods have since been sold fails with
    /// `InsufficientStock` and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the trade does not exist, stock cannot be reversed,
    /// or the database operation fails.
    pub async fn delete(&self, kind: TradeKind, id: Uuid) -> Result<(), TradeError> {
        let trade_id = TradeId::from_uuid(id);
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = lock_trade(&txn, kind, id).await?;
        let lines = load_lines(&txn, id).await?;

        apply_adjustments(
            &txn,
            existing.period,
            &TradeService::reverse_adjustments(kind, &to_core_lines(&lines)),
            self.zero_stock_policy,
        )
        .await?;

        let action = match entry_for_trade(&txn, trade_id).await? {
            Some((owner, entry)) => LedgerService::reverse(Some(owner), Some(&entry)),
            None => LedgerAction::Skip,
        };
        apply_ledger_action(&txn, action).await?;

        trade_lines::Entity::delete_many()
            .filter(trade_lines::Column::TradeId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        trades::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(%trade_id, %kind, "Trade deleted");
        Ok(())
    }

    /// Gets a trade of the given kind with its lines.
    ///
    /// # Errors
    ///
    /// Returns `TradeError::TradeNotFound` if there is no such trade.
    pub async fn find_by_id(&self, kind: TradeKind, id: Uuid) -> Result<TradeWithLines, TradeError> {
        let trade = trades::Entity::find_by_id(id)
            .filter(trades::Column::Kind.eq(DbTradeKind::from(kind)))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(TradeError::TradeNotFound(id))?;
        let lines = load_lines(&self.db, id).await?;

        Ok(TradeWithLines { trade, lines })
    }

    /// Lists trades, newest first.
    pub async fn list(&self, filter: TradeFilter) -> Result<Vec<trades::Model>, TradeError> {
        let mut query = trades::Entity::find();

        if let Some(kind) = filter.kind {
            query = query.filter(
                trades::Column::Kind.eq(DbTradeKind::from(kind)),
            );
        }
        if let Some(period) = filter.period {
            query = query.filter(trades::Column::Period.eq(period));
        }
        if let Some(counterparty_id) = filter.counterparty_id {
            query = query.filter(trades::Column::CounterpartyId.eq(counterparty_id));
        }

        query
            .order_by_desc(trades::Column::OccurredAt)
            .order_by_desc(trades::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    // ========================================================================
    // Sale / Purchase entry points
    // ========================================================================

    /// Creates a sale.
    pub async fn create_sale(&self, input: TradeInput) -> Result<TradeWithLines, TradeError> {
        self.create(TradeKind::Sale, input).await
    }

    /// Edits a sale.
    pub async fn edit_sale(&self, id: Uuid, input: TradeInput) -> Result<TradeWithLines, TradeError> {
        self.edit(TradeKind::Sale, id, input).await
    }

    /// Deletes a sale.
    pub async fn delete_sale(&self, id: Uuid) -> Result<(), TradeError> {
        self.delete(TradeKind::Sale, id).await
    }

    /// Creates a purchase.
    pub async fn create_purchase(&self, input: TradeInput) -> Result<TradeWithLines, TradeError> {
        self.create(TradeKind::Purchase, input).await
    }

    /// Edits a purchase.
    pub async fn edit_purchase(&self, id: Uuid, input: TradeInput) -> Result<TradeWithLines, TradeError> {
        self.edit(TradeKind::Purchase, id, input).await
    }

    /// Deletes a purchase.
    pub async fn delete_purchase(&self, id: Uuid) -> Result<(), TradeError> {
        self.delete(TradeKind::Purchase, id).await
    }
}

/// Resolves the counterparty named on a trade, if any.
async fn resolve_counterparty(
    txn: &DatabaseTransaction,
    name: &str,
    kind: TradeKind,
) -> Result<Option<CounterpartyId>, TradeError> {
    let candidates = candidates_by_name(txn, name).await?;
    let resolved = CounterpartyService::resolve(name, kind, &candidates);
    if resolved.is_none() {
        tracing::debug!(counterparty = name, %kind, "No counterparty by that name, ledger step skipped");
    }
    Ok(resolved)
}

/// Loads a trade for update, checking its kind.
async fn lock_trade(
    txn: &DatabaseTransaction,
    kind: TradeKind,
    id: Uuid,
) -> Result<trades::Model, TradeError> {
    trades::Entity::find_by_id(id)
        .filter(trades::Column::Kind.eq(DbTradeKind::from(kind)))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(TradeError::TradeNotFound(id))
}

async fn load_lines<C>(conn: &C, trade_id: Uuid) -> Result<Vec<trade_lines::Model>, TradeError>
where
    C: ConnectionTrait,
{
    trade_lines::Entity::find()
        .filter(trade_lines::Column::TradeId.eq(trade_id))
        .order_by_asc(trade_lines::Column::Position)
        .all(conn)
        .await
        .map_err(db_err)
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    trade_id: TradeId,
    lines: &[TradeLine],
) -> Result<Vec<trade_lines::Model>, TradeError> {
    let mut models = Vec::with_capacity(lines.len());

    for (position, line) in (0i32..).zip(lines) {
        let model = trade_lines::ActiveModel {
            id: Set(TradeLineId::new().into_inner()),
            trade_id: Set(trade_id.into_inner()),
            position: Set(position),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            line_total: Set(line.line_total),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;
        models.push(model);
    }

    Ok(models)
}

fn to_core_lines(models: &[trade_lines::Model]) -> Vec<TradeLine> {
    models
        .iter()
        .map(|m| TradeLine {
            product_name: m.product_name.clone(),
            quantity: m.quantity,
            unit_price: m.unit_price,
            line_total: m.line_total,
        })
        .collect()
}

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: DbErr) -> TradeError {
    TradeError::Database(e.to_string())
}
