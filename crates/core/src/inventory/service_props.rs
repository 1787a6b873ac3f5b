//! Property-based tests for InventoryService.
//!
//! - Conservation: quantity on hand equals purchased minus sold
//! - Stock never goes negative
//! - A rejected batch changes nothing

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::InventoryError;
use super::service::InventoryService;
use super::types::{StockAdjustment, StockChange, StockLevel};
use stockbook_shared::types::ZeroStockPolicy;

const PRODUCTS: [&str; 3] = ["A", "B", "C"];

/// Applies planned changes the way a store writer would.
fn apply(store: &mut HashMap<String, StockLevel>, changes: &[StockChange]) {
    for change in changes {
        match change {
            StockChange::Insert {
                product_name,
                quantity,
                unit_price,
                ..
            } => {
                assert!(!store.contains_key(product_name), "insert over existing record");
                store.insert(
                    product_name.clone(),
                    StockLevel::new(product_name.clone(), *quantity, *unit_price),
                );
            }
            StockChange::Update {
                product_name,
                previous_quantity,
                quantity,
                unit_price,
                ..
            } => {
                let level = store.get_mut(product_name).expect("update of missing record");
                assert_eq!(level.quantity, *previous_quantity);
                level.quantity = *quantity;
                level.unit_price = *unit_price;
            }
            StockChange::Remove {
                product_name,
                previous_quantity,
            } => {
                let level = store.remove(product_name).expect("remove of missing record");
                assert_eq!(level.quantity, *previous_quantity);
            }
        }
    }
}

/// One operation: (product index, quantity, is_purchase).
fn operation() -> impl Strategy<Value = (usize, i64, bool)> {
    (0..PRODUCTS.len(), 1i64..20, any::<bool>())
}

fn policy() -> impl Strategy<Value = ZeroStockPolicy> {
    prop_oneof![Just(ZeroStockPolicy::Delete), Just(ZeroStockPolicy::Retain)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Quantity on hand equals accepted purchases minus accepted sales, never negative.
    #[test]
    fn prop_conservation(ops in prop::collection::vec(operation(), 1..40), policy in policy()) {
        let mut store: HashMap<String, StockLevel> = HashMap::new();
        let mut expected: HashMap<&str, Decimal> = HashMap::new();

        for (idx, qty, is_purchase) in ops {
            let product = PRODUCTS[idx];
            let qty = Decimal::from(qty);
            let adjustment = if is_purchase {
                StockAdjustment::restock(product, qty, Decimal::TEN)
            } else {
                StockAdjustment::withdraw(product, qty, Decimal::TEN)
            };

            let snapshot = store.clone();
            match InventoryService::plan(&[adjustment], |name| snapshot.get(name).cloned(), policy) {
                Ok(changes) => {
                    apply(&mut store, &changes);
                    let entry = expected.entry(product).or_insert(Decimal::ZERO);
                    if is_purchase { *entry += qty } else { *entry -= qty }
                }
                Err(InventoryError::InsufficientStock { available, requested, .. }) => {
                    prop_assert!(!is_purchase);
                    prop_assert!(requested > available);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }

            for name in PRODUCTS {
                let on_hand = store.get(name).map_or(Decimal::ZERO, |l| l.quantity);
                prop_assert!(on_hand >= Decimal::ZERO);
                prop_assert_eq!(on_hand, expected.get(name).copied().unwrap_or(Decimal::ZERO));
                if policy == ZeroStockPolicy::Delete {
                    prop_assert!(store.get(name).is_none_or(|l| l.quantity > Decimal::ZERO));
                }
            }
        }
    }

    /// A batch either applies every line or is rejected before producing any change.
    #[test]
    fn prop_batch_all_or_nothing(
        stock in prop::collection::vec(0i64..10, PRODUCTS.len()),
        wanted in prop::collection::vec((0..PRODUCTS.len(), 1i64..10), 1..6),
    ) {
        let store: HashMap<String, StockLevel> = PRODUCTS
            .iter()
            .zip(&stock)
            .filter(|(_, qty)| **qty > 0)
            .map(|(name, qty)| ((*name).to_string(), StockLevel::new(*name, Decimal::from(*qty), Decimal::ONE)))
            .collect();

        let adjustments: Vec<StockAdjustment> = wanted
            .iter()
            .map(|(idx, qty)| StockAdjustment::withdraw(PRODUCTS[*idx], Decimal::from(*qty), Decimal::ONE))
            .collect();

        let mut demand = [0i64; PRODUCTS.len()];
        for (idx, qty) in &wanted {
            demand[*idx] += qty;
        }
        let satisfiable = demand.iter().zip(&stock).all(|(d, s)| d <= s);

        let result = InventoryService::plan(&adjustments, |name| store.get(name).cloned(), ZeroStockPolicy::Delete);
        prop_assert_eq!(result.is_ok(), satisfiable);
    }

    /// Withdrawing then restoring the same lines leaves the stored quantity unchanged.
    #[test]
    fn prop_withdraw_then_restore_round_trip(on_hand in 1i64..50, take in 1i64..50) {
        prop_assume!(take <= on_hand);
        let mut store = HashMap::new();
        store.insert("A".to_string(), StockLevel::new("A", Decimal::from(on_hand), Decimal::TWO));

        let snapshot = store.clone();
        let out = InventoryService::plan(
            &[StockAdjustment::withdraw("A", Decimal::from(take), Decimal::TWO)],
            |name| snapshot.get(name).cloned(),
            ZeroStockPolicy::Delete,
        )
        .unwrap();
        apply(&mut store, &out);

        let snapshot = store.clone();
        let back = InventoryService::plan(
            &[StockAdjustment::restore("A", Decimal::from(take), Decimal::TWO)],
            |name| snapshot.get(name).cloned(),
            ZeroStockPolicy::Delete,
        )
        .unwrap();
        apply(&mut store, &back);

        prop_assert_eq!(store.get("A").map(|l| l.quantity), Some(Decimal::from(on_hand)));
        prop_assert_eq!(store.get("A").map(|l| l.unit_price), Some(Decimal::TWO));
    }
}
