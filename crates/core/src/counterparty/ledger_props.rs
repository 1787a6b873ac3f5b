//! Property-based tests for LedgerService.
//!
//! - The incrementally maintained balance always equals the ledger sum
//! - Reversing a trade's entry restores the previous balance

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_shared::types::{CounterpartyId, LedgerEntryId, TradeId};

use super::ledger::LedgerService;
use super::types::{EntryDraft, LedgerAction, LedgerEntry};
use crate::trade::TradeKind;

/// One ledger operation against a small pool of trades.
#[derive(Debug, Clone)]
enum Op {
    Record { trade: usize, is_sale: bool, amount: i64 },
    Reverse { trade: usize },
    Pay { amount: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4, any::<bool>(), 0i64..500).prop_map(|(trade, is_sale, amount)| Op::Record {
            trade,
            is_sale,
            amount
        }),
        (0usize..4).prop_map(|trade| Op::Reverse { trade }),
        (1i64..200).prop_map(|amount| Op::Pay { amount }),
    ]
}

fn draft(kind: TradeKind, amount: Decimal, trade: TradeId) -> EntryDraft {
    EntryDraft {
        kind,
        amount,
        occurred_at: Utc::now(),
        lines: Vec::new(),
        source_trade_id: trade,
    }
}

/// Applies an action to an in-memory ledger keyed by entry ID.
fn apply(entries: &mut HashMap<LedgerEntryId, LedgerEntry>, balance: &mut Decimal, action: LedgerAction) {
    *balance += action.balance_delta();
    match action {
        LedgerAction::Insert { entry, .. } | LedgerAction::Overwrite { entry, .. } => {
            entries.insert(entry.id, entry);
        }
        LedgerAction::Remove { entry_id, .. } => {
            entries.remove(&entry_id);
        }
        LedgerAction::Skip => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After any sequence of record/reverse/payment operations the balance
    /// equals the signed sum of live entries plus payments.
    #[test]
    fn prop_balance_matches_ledger(ops in prop::collection::vec(op(), 1..50)) {
        let cp = CounterpartyId::new();
        let trades: Vec<TradeId> = (0..4).map(|_| TradeId::new()).collect();
        let mut entries: HashMap<LedgerEntryId, LedgerEntry> = HashMap::new();
        let mut payments: Vec<Decimal> = Vec::new();
        let mut balance = Decimal::ZERO;

        for op in ops {
            match op {
                Op::Record { trade, is_sale, amount } => {
                    let trade_id = trades[trade];
                    let existing = entries.values().find(|e| e.source_trade_id == Some(trade_id)).cloned();
                    let kind = existing.as_ref().map_or(
                        if is_sale { TradeKind::Sale } else { TradeKind::Purchase },
                        |e| e.kind,
                    );
                    let action = LedgerService::replace(
                        Some(cp),
                        existing.as_ref(),
                        draft(kind, Decimal::from(amount), trade_id),
                    )
                    .unwrap();
                    apply(&mut entries, &mut balance, action);
                }
                Op::Reverse { trade } => {
                    let existing = entries.values().find(|e| e.source_trade_id == Some(trades[trade])).cloned();
                    let action = LedgerService::reverse(Some(cp), existing.as_ref());
                    apply(&mut entries, &mut balance, action);
                }
                Op::Pay { amount } => {
                    let delta = LedgerService::payment_delta(Decimal::from(amount)).unwrap();
                    balance += delta;
                    payments.push(delta);
                }
            }

            let live: Vec<LedgerEntry> = entries.values().cloned().collect();
            let audit = LedgerService::audit(balance, &live, &payments);
            prop_assert!(audit.is_consistent, "drift {}", audit.drift);

            // At most one entry per trade.
            for trade_id in &trades {
                prop_assert!(entries.values().filter(|e| e.source_trade_id == Some(*trade_id)).count() <= 1);
            }
        }
    }

    /// Appending then reversing an entry is a no-op on the balance.
    #[test]
    fn prop_append_then_reverse_restores_balance(start in -1000i64..1000, amount in 0i64..1000, is_sale in any::<bool>()) {
        let cp = CounterpartyId::new();
        let kind = if is_sale { TradeKind::Sale } else { TradeKind::Purchase };
        let mut balance = Decimal::from(start);

        let appended = LedgerService::append(Some(cp), draft(kind, Decimal::from(amount), TradeId::new())).unwrap();
        balance += appended.balance_delta();
        let LedgerAction::Insert { entry, .. } = appended else {
            return Err(TestCaseError::fail("expected insert"));
        };

        balance += LedgerService::reverse(Some(cp), Some(&entry)).balance_delta();
        prop_assert_eq!(balance, Decimal::from(start));
    }
}
