//! Inventory repository.
//!
//! Stock rows are read-only from the outside; they change only through
//! [`apply_adjustments`], which the trade repository calls inside its
//! transaction.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use stockbook_core::inventory::{
    InventoryService, StockAdjustment, StockChange, StockLevel, ZeroStockPolicy,
};
use stockbook_core::trade::TradeError;
use stockbook_shared::types::InventoryRecordId;

use crate::entities::inventory_records;

/// Read access to inventory records.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the record for a product in a period.
    pub async fn find_by_product(
        &self,
        product_name: &str,
        period: i32,
    ) -> Result<Option<inventory_records::Model>, DbErr> {
        inventory_records::Entity::find()
            .filter(inventory_records::Column::ProductName.eq(product_name.trim()))
            .filter(inventory_records::Column::Period.eq(period))
            .one(&self.db)
            .await
    }

    /// Lists the records of a period, ordered by product name.
    pub async fn list(&self, period: i32) -> Result<Vec<inventory_records::Model>, DbErr> {
        inventory_records::Entity::find()
            .filter(inventory_records::Column::Period.eq(period))
            .order_by_asc(inventory_records::Column::ProductName)
            .all(&self.db)
            .await
    }
}

/// Plans and writes a batch of stock adjustments for one period.
///
/// Touched rows are locked (`FOR UPDATE`, in product name order) before
/// planning, then handed to [`write_changes`].
pub(crate) async fn apply_adjustments<C>(
    conn: &C,
    period: i32,
    adjustments: &[StockAdjustment],
    policy: ZeroStockPolicy,
) -> Result<Vec<StockChange>, TradeError>
where
    C: ConnectionTrait,
{
    let products: Vec<String> = InventoryService::merge(adjustments)
        .into_iter()
        .map(|a| a.product_name)
        .collect();
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let rows: HashMap<String, StockLevel> = inventory_records::Entity::find()
        .filter(inventory_records::Column::Period.eq(period))
        .filter(inventory_records::Column::ProductName.is_in(products))
        .order_by_asc(inventory_records::Column::ProductName)
        .lock_exclusive()
        .all(conn)
        .await
        .map_err(|e| TradeError::Database(e.to_string()))?
        .into_iter()
        .map(|row| {
            let level = StockLevel::new(row.product_name.as_str(), row.quantity, row.unit_price);
            (row.product_name, level)
        })
        .collect();

    let changes = InventoryService::plan(adjustments, |name| rows.get(name).cloned(), policy)?;
    write_changes(conn, period, &changes).await?;

    Ok(changes)
}

/// Writes planned stock changes for one period.
///
/// Every update and delete is a compare-and-set on the quantity the change
/// was planned against. A row that changed underneath, or a concurrent insert
/// of the same product, yields `TradeError::ConcurrentModification`.
///
/// # Errors
///
/// Returns `TradeError::ConcurrentModification` when a guard fails and
/// `TradeError::Database` for any other database error.
pub async fn write_changes<C>(conn: &C, period: i32, changes: &[StockChange]) -> Result<(), TradeError>
where
    C: ConnectionTrait,
{
    for change in changes {
        write_change(conn, period, change).await?;
    }
    Ok(())
}

async fn write_change<C>(conn: &C, period: i32, change: &StockChange) -> Result<(), TradeError>
where
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();
    let row = inventory_records::Column::ProductName
        .eq(change.product_name())
        .and(inventory_records::Column::Period.eq(period));

    let rows_affected = match change {
        StockChange::Insert {
            product_name,
            quantity,
            unit_price,
            total_value,
        } => {
            let record = inventory_records::ActiveModel {
                id: Set(InventoryRecordId::new().into_inner()),
                product_name: Set(product_name.clone()),
                period: Set(period),
                quantity: Set(*quantity),
                unit_price: Set(*unit_price),
                total_value: Set(*total_value),
                created_at: Set(now),
                updated_at: Set(now),
            };
            match record.insert(conn).await {
                Ok(_) => 1,
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => 0,
                Err(e) => return Err(TradeError::Database(e.to_string())),
            }
        }
        StockChange::Update {
            previous_quantity,
            quantity,
            unit_price,
            total_value,
            ..
        } => {
            inventory_records::Entity::update_many()
                .col_expr(inventory_records::Column::Quantity, Expr::value(*quantity))
                .col_expr(inventory_records::Column::UnitPrice, Expr::value(*unit_price))
                .col_expr(inventory_records::Column::TotalValue, Expr::value(*total_value))
                .col_expr(inventory_records::Column::UpdatedAt, Expr::value(now))
                .filter(row)
                .filter(inventory_records::Column::Quantity.eq(*previous_quantity))
                .exec(conn)
                .await
                .map_err(|e| TradeError::Database(e.to_string()))?
                .rows_affected
        }
        StockChange::Remove {
            previous_quantity, ..
        } => {
            inventory_records::Entity::delete_many()
                .filter(row)
                .filter(inventory_records::Column::Quantity.eq(*previous_quantity))
                .exec(conn)
                .await
                .map_err(|e| TradeError::Database(e.to_string()))?
                .rows_affected
        }
    };

    if rows_affected == 0 {
        tracing::warn!(product = change.product_name(), period, "Inventory write lost a race");
        return Err(TradeError::ConcurrentModification(format!(
            "inventory record {}",
            change.product_name()
        )));
    }

    tracing::debug!(
        product = change.product_name(),
        period,
        quantity = %change.resulting_quantity(),
        "Inventory record written"
    );
    Ok(())
}

/// Value of all stock in a period.
///
/// Saturates instead of overflowing.
#[must_use]
pub fn total_value(records: &[inventory_records::Model]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.total_value))
}
