//! Inventory planning service.
//!
//! Pure business logic: reads current stock through a lookup closure and
//! returns the writes to perform. Nothing is persisted here.

use rust_decimal::Decimal;
use stockbook_shared::types::ZeroStockPolicy;

use super::error::InventoryError;
use crate::amount;
use super::types::{StockAdjustment, StockChange, StockLevel};

/// Stateless inventory reconciliation service.
pub struct InventoryService;

impl InventoryService {
    /// Merges adjustments that touch the same product.
    ///
    /// Quantities are summed and price updates combined with
    /// [`PriceUpdate::then`](super::types::PriceUpdate::then). Products keep the
    /// order in which they first appear.
    #[must_use]
    pub fn merge(adjustments: &[StockAdjustment]) -> Vec<StockAdjustment> {
        let mut merged: Vec<StockAdjustment> = Vec::with_capacity(adjustments.len());

        for adjustment in adjustments {
            let name = adjustment.product_name.trim();
            if let Some(existing) = merged.iter_mut().find(|m| m.product_name == name) {
                existing.quantity_delta =
                    existing.quantity_delta.saturating_add(adjustment.quantity_delta);
                existing.price = existing.price.then(adjustment.price);
            } else {
                merged.push(StockAdjustment {
                    product_name: name.to_string(),
                    quantity_delta: adjustment.quantity_delta,
                    price: adjustment.price,
                });
            }
        }

        merged
    }

    /// Plans the inventory writes for a batch of adjustments.
    ///
    /// Every merged adjustment is checked against `lookup` before any change is
    /// returned, so a batch is all-or-nothing: the first product that would go
    /// negative fails the whole plan with [`InventoryError::InsufficientStock`].
    ///
    /// # Arguments
    ///
    /// * `adjustments` - Signed quantity changes, possibly repeating products
    /// * `lookup` - Returns the current stock of a product, `None` if no record exists
    /// * `policy` - What to do with records whose quantity reaches zero
    ///
    /// # Errors
    ///
    /// Returns `InventoryError` if a product name is blank, a new price is not
    /// positive, stock would go negative, or the resulting quantity or value
    /// is too large to store.
    pub fn plan<F>(
        adjustments: &[StockAdjustment],
        lookup: F,
        policy: ZeroStockPolicy,
    ) -> Result<Vec<StockChange>, InventoryError>
    where
        F: Fn(&str) -> Option<StockLevel>,
    {
        let merged = Self::merge(adjustments);
        let mut changes = Vec::with_capacity(merged.len());

        for adjustment in &merged {
            if let Some(change) = Self::plan_one(adjustment, lookup(&adjustment.product_name), policy)? {
                changes.push(change);
            }
        }

        Ok(changes)
    }

    /// Plans a single merged adjustment.
    fn plan_one(
        adjustment: &StockAdjustment,
        current: Option<StockLevel>,
        policy: ZeroStockPolicy,
    ) -> Result<Option<StockChange>, InventoryError> {
        if adjustment.product_name.is_empty() {
            return Err(InventoryError::EmptyProductName);
        }

        let unit_price = adjustment
            .price
            .resolve(current.as_ref().map(|c| c.unit_price));
        if unit_price <= Decimal::ZERO {
            return Err(InventoryError::InvalidPrice {
                product: adjustment.product_name.clone(),
                price: unit_price,
            });
        }

        let out_of_range = || InventoryError::OutOfRange {
            product: adjustment.product_name.clone(),
        };
        let available = current.as_ref().map_or(Decimal::ZERO, |c| c.quantity);
        let quantity = amount::add(available, adjustment.quantity_delta).ok_or_else(out_of_range)?;
        if quantity < Decimal::ZERO {
            return Err(InventoryError::InsufficientStock {
                product: adjustment.product_name.clone(),
                available,
                requested: -adjustment.quantity_delta,
            });
        }
        let total_value = amount::value_of(quantity, unit_price).ok_or_else(out_of_range)?;

        let Some(current) = current else {
            // Nothing stored: only incoming stock creates a record.
            if adjustment.quantity_delta > Decimal::ZERO {
                return Ok(Some(StockChange::Insert {
                    product_name: adjustment.product_name.clone(),
                    quantity,
                    unit_price,
                    total_value,
                }));
            }
            return Ok(None);
        };

        if quantity.is_zero() && policy == ZeroStockPolicy::Delete {
            return Ok(Some(StockChange::Remove {
                product_name: adjustment.product_name.clone(),
                previous_quantity: current.quantity,
            }));
        }

        if adjustment.quantity_delta.is_zero() && unit_price == current.unit_price {
            return Ok(None);
        }

        Ok(Some(StockChange::Update {
            product_name: adjustment.product_name.clone(),
            previous_quantity: current.quantity,
            quantity,
            unit_price,
            total_value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::types::PriceUpdate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn stock(levels: &[(&str, Decimal, Decimal)]) -> HashMap<String, StockLevel> {
        levels
            .iter()
            .map(|(name, qty, price)| ((*name).to_string(), StockLevel::new(*name, *qty, *price)))
            .collect()
    }

    fn plan(
        adjustments: &[StockAdjustment],
        levels: &HashMap<String, StockLevel>,
        policy: ZeroStockPolicy,
    ) -> Result<Vec<StockChange>, InventoryError> {
        InventoryService::plan(adjustments, |name| levels.get(name).cloned(), policy)
    }

    #[test]
    fn test_restock_creates_missing_record() {
        let levels = stock(&[]);
        let changes = plan(
            &[StockAdjustment::restock("A", dec!(5), dec!(10))],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert_eq!(
            changes,
            vec![StockChange::Insert {
                product_name: "A".to_string(),
                quantity: dec!(5),
                unit_price: dec!(10),
                total_value: dec!(50),
            }]
        );
        assert_eq!(changes[0].total_value(), dec!(50));
    }

    #[test]
    fn test_restock_reprices_existing_record() {
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let changes = plan(
            &[StockAdjustment::restock("A", dec!(3), dec!(12))],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert_eq!(
            changes,
            vec![StockChange::Update {
                product_name: "A".to_string(),
                previous_quantity: dec!(5),
                quantity: dec!(8),
                unit_price: dec!(12),
                total_value: dec!(96),
            }]
        );
        assert_eq!(changes[0].total_value(), dec!(96));
    }

    #[test]
    fn test_withdraw_keeps_stored_price() {
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let changes = plan(
            &[StockAdjustment::withdraw("A", dec!(2), dec!(15))],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert_eq!(
            changes,
            vec![StockChange::Update {
                product_name: "A".to_string(),
                previous_quantity: dec!(5),
                quantity: dec!(3),
                unit_price: dec!(10),
                total_value: dec!(30),
            }]
        );
    }

    #[test]
    fn test_withdraw_everything_deletes_record() {
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let changes = plan(
            &[StockAdjustment::withdraw("A", dec!(5), dec!(10))],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert_eq!(
            changes,
            vec![StockChange::Remove {
                product_name: "A".to_string(),
                previous_quantity: dec!(5),
            }]
        );
    }

    #[test]
    fn test_withdraw_everything_retains_record() {
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let changes = plan(
            &[StockAdjustment::withdraw("A", dec!(5), dec!(10))],
            &levels,
            ZeroStockPolicy::Retain,
        )
        .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].resulting_quantity(), Decimal::ZERO);
        assert!(matches!(changes[0], StockChange::Update { .. }));
    }

    #[test]
    fn test_insufficient_stock_rejects_whole_batch() {
        let levels = stock(&[("A", dec!(5), dec!(10)), ("B", dec!(1), dec!(3))]);
        let result = plan(
            &[
                StockAdjustment::withdraw("A", dec!(2), dec!(10)),
                StockAdjustment::withdraw("B", dec!(2), dec!(3)),
            ],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert_eq!(
            result,
            Err(InventoryError::InsufficientStock {
                product: "B".to_string(),
                available: dec!(1),
                requested: dec!(2),
            })
        );
    }

    #[test]
    fn test_withdraw_missing_product_is_insufficient() {
        let levels = stock(&[]);
        let result = plan(
            &[StockAdjustment::withdraw("Ghost", dec!(1), dec!(10))],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock { ref product, available, .. })
                if product == "Ghost" && available.is_zero()
        ));
    }

    #[test]
    fn test_repeated_lines_are_checked_together() {
        // Two lines of 3 each pass individually but not together.
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let result = plan(
            &[
                StockAdjustment::withdraw("A", dec!(3), dec!(10)),
                StockAdjustment::withdraw("A", dec!(3), dec!(10)),
            ],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock { requested, .. }) if requested == dec!(6)
        ));
    }

    #[test]
    fn test_restore_recreates_deleted_record_with_fallback_price() {
        let levels = stock(&[]);
        let changes = plan(
            &[StockAdjustment::restore("A", dec!(5), dec!(10))],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert_eq!(
            changes,
            vec![StockChange::Insert {
                product_name: "A".to_string(),
                quantity: dec!(5),
                unit_price: dec!(10),
                total_value: dec!(50),
            }]
        );
    }

    #[test]
    fn test_net_zero_without_reprice_is_noop() {
        let levels = stock(&[("A", dec!(5), dec!(10))]);
        let changes = plan(
            &[
                StockAdjustment::restore("A", dec!(2), dec!(10)),
                StockAdjustment::withdraw("A", dec!(2), dec!(10)),
            ],
            &levels,
            ZeroStockPolicy::Delete,
        )
        .unwrap();

        assert!(changes.is_empty());
    }

    #[test]
    fn test_merge_reprice_wins_over_keep() {
        let merged = InventoryService::merge(&[
            StockAdjustment::withdraw("A", dec!(4), dec!(9)),
            StockAdjustment::restock("A", dec!(6), dec!(11)),
            StockAdjustment::restore("A", dec!(1), dec!(9)),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity_delta, dec!(3));
        assert_eq!(merged[0].price, PriceUpdate::Reprice(dec!(11)));
    }

    #[test]
    fn test_merge_trims_product_names() {
        let merged = InventoryService::merge(&[
            StockAdjustment::restock("A ", dec!(1), dec!(2)),
            StockAdjustment::restock(" A", dec!(1), dec!(2)),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].product_name, "A");
    }

    #[test]
    fn test_blank_product_name_rejected() {
        let levels = stock(&[]);
        let result = plan(
            &[StockAdjustment::restock("  ", dec!(1), dec!(2))],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert_eq!(result, Err(InventoryError::EmptyProductName));
    }

    #[test]
    fn test_quantity_beyond_storage_rejected() {
        let levels = stock(&[("A", dec!(999_999_999_999_999), dec!(1))]);
        let result = plan(
            &[StockAdjustment::restock("A", dec!(1), dec!(1))],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert_eq!(
            result,
            Err(InventoryError::OutOfRange {
                product: "A".to_string(),
            })
        );
    }

    #[test]
    fn test_stock_value_beyond_storage_rejected() {
        let levels = stock(&[("A", dec!(100_000_000), dec!(1))]);
        let result = plan(
            &[StockAdjustment::restock("A", dec!(1), dec!(10_000_000))],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert!(matches!(result, Err(InventoryError::OutOfRange { .. })));
    }

    #[test]
    fn test_saturated_merge_is_out_of_range_not_a_panic() {
        let levels = stock(&[]);
        let result = plan(
            &[
                StockAdjustment::restock("A", Decimal::MAX, dec!(1)),
                StockAdjustment::restock("A", Decimal::MAX, dec!(1)),
            ],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert!(matches!(result, Err(InventoryError::OutOfRange { .. })));
    }

    #[test]
    fn test_non_positive_reprice_rejected() {
        let levels = stock(&[]);
        let result = plan(
            &[StockAdjustment::restock("A", dec!(1), dec!(0))],
            &levels,
            ZeroStockPolicy::Delete,
        );

        assert!(matches!(result, Err(InventoryError::InvalidPrice { .. })));
    }
}
