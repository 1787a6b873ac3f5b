//! Trade planning service.
//!
//! Turns a sale or purchase request into validated lines, the inventory
//! adjustments it implies and the ledger entry describing it. The storage
//! layer executes the plan.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use stockbook_shared::types::TradeId;

use super::error::TradeError;
use super::types::{TradeKind, TradeLine, TradeLineInput};
use crate::amount;
use crate::counterparty::EntryDraft;
use crate::inventory::StockAdjustment;

/// Stateless trade service.
pub struct TradeService;

impl TradeService {
    /// Trims and validates the counterparty name on a trade.
    ///
    /// # Errors
    ///
    /// Returns `TradeError::EmptyCounterpartyName` if the name is blank.
    pub fn validate_counterparty_name(name: &str) -> Result<String, TradeError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TradeError::EmptyCounterpartyName);
        }
        Ok(trimmed.to_string())
    }

    /// Validates submitted lines and computes their totals.
    ///
    /// Lines must be non-empty and each must carry a product name, a positive
    /// quantity and a positive unit price. Quantities and prices keep at most
    /// four decimal places, and every value including the trade total must
    /// fit in storage. Product names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, identified by line index.
    pub fn validate_and_price(lines: &[TradeLineInput]) -> Result<Vec<TradeLine>, TradeError> {
        if lines.is_empty() {
            return Err(TradeError::EmptyLines);
        }

        let priced = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let product_name = line
                    .product_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or(TradeError::MissingField {
                        line: idx,
                        field: "product_name",
                    })?;
                let quantity = line.quantity.ok_or(TradeError::MissingField {
                    line: idx,
                    field: "quantity",
                })?;
                let unit_price = line.unit_price.ok_or(TradeError::MissingField {
                    line: idx,
                    field: "unit_price",
                })?;

                let out_of_range = |field| TradeError::LineOutOfRange { line: idx, field };
                if quantity <= Decimal::ZERO || quantity.normalize().scale() > amount::SCALE {
                    return Err(TradeError::InvalidQuantity { line: idx });
                }
                if !amount::in_range(quantity) {
                    return Err(out_of_range("quantity"));
                }
                if unit_price <= Decimal::ZERO || unit_price.normalize().scale() > amount::SCALE {
                    return Err(TradeError::InvalidPrice { line: idx });
                }
                if !amount::in_range(unit_price) {
                    return Err(out_of_range("unit_price"));
                }

                TradeLine::priced(product_name, quantity, unit_price)
                    .ok_or_else(|| out_of_range("line_total"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        priced
            .iter()
            .try_fold(Decimal::ZERO, |acc, l| amount::add(acc, l.line_total))
            .ok_or(TradeError::TotalOutOfRange)?;

        Ok(priced)
    }

    /// Sum of line totals.
    ///
    /// Saturates instead of overflowing; lines from
    /// [`validate_and_price`](Self::validate_and_price) never reach the bound.
    #[must_use]
    pub fn total(lines: &[TradeLine]) -> Decimal {
        lines
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_total))
    }

    /// Inventory period a trade belongs to (calendar year).
    #[must_use]
    pub fn period_of(occurred_at: DateTime<Utc>) -> i32 {
        occurred_at.year()
    }

    /// Adjustments applied when a trade is created.
    ///
    /// Purchases add stock at the purchase price; sales remove stock and leave
    /// the stored price alone.
    #[must_use]
    pub fn create_adjustments(kind: TradeKind, lines: &[TradeLine]) -> Vec<StockAdjustment> {
        lines
            .iter()
            .map(|l| match kind {
                TradeKind::Sale => StockAdjustment::withdraw(l.product_name.as_str(), l.quantity, l.unit_price),
                TradeKind::Purchase => StockAdjustment::restock(l.product_name.as_str(), l.quantity, l.unit_price),
            })
            .collect()
    }

    /// Adjustments that undo a stored trade.
    ///
    /// A deleted sale puts its goods back; a deleted purchase takes them out
    /// again. Neither changes the stored price.
    #[must_use]
    pub fn reverse_adjustments(kind: TradeKind, lines: &[TradeLine]) -> Vec<StockAdjustment> {
        lines
            .iter()
            .map(|l| match kind {
                TradeKind::Sale => StockAdjustment::restore(l.product_name.as_str(), l.quantity, l.unit_price),
                TradeKind::Purchase => StockAdjustment::withdraw(l.product_name.as_str(), l.quantity, l.unit_price),
            })
            .collect()
    }

    /// Adjustments for replacing `old` lines with `new` ones.
    ///
    /// The reversal of the old lines and the creation of the new ones are
    /// planned as a single batch, so the inventory check sees the net change
    /// per product.
    #[must_use]
    pub fn edit_adjustments(kind: TradeKind, old: &[TradeLine], new: &[TradeLine]) -> Vec<StockAdjustment> {
        let mut adjustments = Self::reverse_adjustments(kind, old);
        adjustments.extend(Self::create_adjustments(kind, new));
        adjustments
    }

    /// Ledger entry describing a trade.
    #[must_use]
    pub fn ledger_draft(
        kind: TradeKind,
        trade_id: TradeId,
        occurred_at: DateTime<Utc>,
        lines: &[TradeLine],
    ) -> EntryDraft {
        EntryDraft {
            kind,
            amount: Self::total(lines),
            occurred_at,
            lines: lines.to_vec(),
            source_trade_id: trade_id,
        }
    }
}
