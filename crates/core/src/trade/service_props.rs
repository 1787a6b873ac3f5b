//! Property-based tests for TradeService.
//!
//! - Editing a sale from Q1 to Q2 moves stock by Q1 - Q2 and the balance by (Q2 - Q1) x price
//! - Creating then deleting a trade restores stock and balance

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_shared::types::{CounterpartyId, TradeId, ZeroStockPolicy};

use super::service::TradeService;
use super::types::{TradeKind, TradeLine};
use crate::counterparty::{LedgerAction, LedgerService};
use crate::inventory::{InventoryService, StockAdjustment, StockChange, StockLevel};

type Store = HashMap<String, StockLevel>;

/// Plans and applies adjustments against an in-memory store.
fn adjust(store: &mut Store, adjustments: &[StockAdjustment], policy: ZeroStockPolicy) -> bool {
    let snapshot = store.clone();
    let Ok(changes) = InventoryService::plan(adjustments, |name| snapshot.get(name).cloned(), policy) else {
        return false;
    };
    for change in changes {
        match change {
            StockChange::Insert {
                product_name,
                quantity,
                unit_price,
                ..
            }
            | StockChange::Update {
                product_name,
                quantity,
                unit_price,
                ..
            } => {
                store.insert(product_name.clone(), StockLevel::new(product_name, quantity, unit_price));
            }
            StockChange::Remove { product_name, .. } => {
                store.remove(&product_name);
            }
        }
    }
    true
}

fn on_hand(store: &Store, product: &str) -> Decimal {
    store.get(product).map_or(Decimal::ZERO, |l| l.quantity)
}

fn policy() -> impl Strategy<Value = ZeroStockPolicy> {
    prop_oneof![Just(ZeroStockPolicy::Delete), Just(ZeroStockPolicy::Retain)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Edit is equivalent to delete followed by create.
    #[test]
    fn prop_sale_edit_moves_by_difference(
        stock in 1i64..100,
        q1 in 1i64..100,
        q2 in 1i64..100,
        price in 1i64..50,
        policy in policy(),
    ) {
        prop_assume!(q1 <= stock && q2 <= stock);
        let cp = CounterpartyId::new();
        let trade_id = TradeId::new();
        let price = Decimal::from(price);
        let mut store = Store::new();
        store.insert("A".to_string(), StockLevel::new("A", Decimal::from(stock), price));

        let old = vec![TradeLine::new("A", Decimal::from(q1), price)];
        prop_assert!(adjust(&mut store, &TradeService::create_adjustments(TradeKind::Sale, &old), policy));
        let appended = LedgerService::append(
            Some(cp),
            TradeService::ledger_draft(TradeKind::Sale, trade_id, Utc::now(), &old),
        )
        .unwrap();
        let entry = match appended {
            LedgerAction::Insert { entry, .. } => entry,
            other => return Err(TestCaseError::fail(format!("unexpected {other:?}"))),
        };
        let before = on_hand(&store, "A");

        let new = vec![TradeLine::new("A", Decimal::from(q2), price)];
        prop_assert!(adjust(&mut store, &TradeService::edit_adjustments(TradeKind::Sale, &old, &new), policy));
        let replaced = LedgerService::replace(
            Some(cp),
            Some(&entry),
            TradeService::ledger_draft(TradeKind::Sale, trade_id, Utc::now(), &new),
        )
        .unwrap();

        prop_assert_eq!(on_hand(&store, "A") - before, Decimal::from(q1 - q2));
        prop_assert_eq!(replaced.balance_delta(), Decimal::from(q2 - q1) * price);
        let overwritten = matches!(replaced, LedgerAction::Overwrite { .. });
        prop_assert!(overwritten, "expected an overwrite, got {:?}", replaced);
    }

    /// Creating and immediately deleting a trade leaves stock and balance unchanged.
    #[test]
    fn prop_create_then_delete_round_trip(
        stock in 0i64..100,
        qty in 1i64..100,
        price in 1i64..50,
        is_sale in any::<bool>(),
        policy in policy(),
    ) {
        prop_assume!(!is_sale || qty <= stock);
        let kind = if is_sale { TradeKind::Sale } else { TradeKind::Purchase };
        let cp = CounterpartyId::new();
        let price = Decimal::from(price);
        let mut store = Store::new();
        if stock > 0 {
            store.insert("A".to_string(), StockLevel::new("A", Decimal::from(stock), price));
        }
        let start_quantity = on_hand(&store, "A");
        let mut balance = Decimal::from(17);
        let start_balance = balance;

        let lines = vec![TradeLine::new("A", Decimal::from(qty), price)];
        prop_assert!(adjust(&mut store, &TradeService::create_adjustments(kind, &lines), policy));
        let action = LedgerService::append(
            Some(cp),
            TradeService::ledger_draft(kind, TradeId::new(), Utc::now(), &lines),
        )
        .unwrap();
        balance += action.balance_delta();
        let LedgerAction::Insert { entry, .. } = action else {
            return Err(TestCaseError::fail("expected insert"));
        };

        prop_assert!(adjust(&mut store, &TradeService::reverse_adjustments(kind, &lines), policy));
        balance += LedgerService::reverse(Some(cp), Some(&entry)).balance_delta();

        prop_assert_eq!(on_hand(&store, "A"), start_quantity);
        prop_assert_eq!(balance, start_balance);
    }

    /// A purchase whose goods were sold cannot be deleted.
    #[test]
    fn prop_purchase_delete_never_goes_negative(bought in 1i64..50, sold in 1i64..50) {
        prop_assume!(sold <= bought);
        let mut store = Store::new();
        let purchase = vec![TradeLine::new("A", Decimal::from(bought), Decimal::TEN)];
        let sale = vec![TradeLine::new("A", Decimal::from(sold), Decimal::TEN)];

        prop_assert!(adjust(&mut store, &TradeService::create_adjustments(TradeKind::Purchase, &purchase), ZeroStockPolicy::Delete));
        prop_assert!(adjust(&mut store, &TradeService::create_adjustments(TradeKind::Sale, &sale), ZeroStockPolicy::Delete));

        let snapshot = store.clone();
        let deleted = adjust(&mut store, &TradeService::reverse_adjustments(TradeKind::Purchase, &purchase), ZeroStockPolicy::Delete);
        prop_assert!(!deleted);
        prop_assert_eq!(store, snapshot);
    }
}
