//! Running-balance arithmetic for counterparty ledgers.
//!
//! Sales increase a counterparty's balance, purchases decrease it, and
//! payments increase it. The balance is maintained incrementally: every
//! operation here yields the exact delta to add, never a recomputed total.

use rust_decimal::Decimal;
use serde::Serialize;
use stockbook_shared::types::{CounterpartyId, LedgerEntryId};

use super::error::LedgerError;
use super::types::{EntryDraft, LedgerAction, LedgerEntry, OpeningEntry};
use crate::amount;
use crate::trade::TradeKind;

/// Result of comparing a stored balance with the one implied by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceAudit {
    /// Balance stored on the counterparty.
    pub recorded: Decimal,
    /// Signed sum of live entries plus payments.
    pub expected: Decimal,
    /// `recorded - expected`.
    pub drift: Decimal,
    /// True when there is no drift.
    pub is_consistent: bool,
}

/// Stateless ledger service.
pub struct LedgerService;

impl LedgerService {
    /// Signed contribution of an entry to the balance.
    #[must_use]
    pub fn signed_amount(kind: TradeKind, amount: Decimal) -> Decimal {
        match kind {
            TradeKind::Sale => amount,
            TradeKind::Purchase => -amount,
        }
    }

    /// Appends an entry for a trade.
    ///
    /// Returns [`LedgerAction::Skip`] when the trade has no counterparty: the
    /// link is a soft reference and a missing counterparty is not an error.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` for a negative trade total.
    pub fn append(
        counterparty_id: Option<CounterpartyId>,
        draft: EntryDraft,
    ) -> Result<LedgerAction, LedgerError> {
        Self::check_entry_amount(draft.amount)?;
        let Some(counterparty_id) = counterparty_id else {
            return Ok(LedgerAction::Skip);
        };

        let balance_delta = Self::signed_amount(draft.kind, draft.amount);
        Ok(LedgerAction::Insert {
            counterparty_id,
            entry: LedgerEntry {
                id: LedgerEntryId::new(),
                kind: draft.kind,
                amount: draft.amount,
                occurred_at: draft.occurred_at,
                lines: draft.lines,
                source_trade_id: Some(draft.source_trade_id),
            },
            balance_delta,
        })
    }

    /// Replaces the entry linked to a trade, falling back to an append when no
    /// entry exists yet.
    ///
    /// The balance moves by the difference between the new and old signed
    /// amounts; the entry keeps its ID.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative amount or when the stored entry has a
    /// different kind.
    pub fn replace(
        counterparty_id: Option<CounterpartyId>,
        existing: Option<&LedgerEntry>,
        draft: EntryDraft,
    ) -> Result<LedgerAction, LedgerError> {
        let Some(existing) = existing else {
            return Self::append(counterparty_id, draft);
        };
        Self::check_entry_amount(draft.amount)?;
        if existing.kind != draft.kind {
            return Err(LedgerError::KindMismatch {
                stored: existing.kind,
                requested: draft.kind,
            });
        }
        let Some(counterparty_id) = counterparty_id else {
            return Ok(LedgerAction::Skip);
        };

        let balance_delta = Self::signed_amount(draft.kind, draft.amount)
            - Self::signed_amount(existing.kind, existing.amount);
        Ok(LedgerAction::Overwrite {
            counterparty_id,
            entry: LedgerEntry {
                id: existing.id,
                kind: draft.kind,
                amount: draft.amount,
                occurred_at: draft.occurred_at,
                lines: draft.lines,
                source_trade_id: Some(draft.source_trade_id),
            },
            balance_delta,
        })
    }

    /// Removes the entry linked to a trade, undoing its balance contribution.
    #[must_use]
    pub fn reverse(counterparty_id: Option<CounterpartyId>, existing: Option<&LedgerEntry>) -> LedgerAction {
        match (counterparty_id, existing) {
            (Some(counterparty_id), Some(entry)) => LedgerAction::Remove {
                counterparty_id,
                entry_id: entry.id,
                balance_delta: -Self::signed_amount(entry.kind, entry.amount),
            },
            _ => LedgerAction::Skip,
        }
    }

    /// Balance delta of a payment.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositivePayment` unless `amount > 0`, and
    /// `LedgerError::AmountOutOfRange` if it cannot be stored exactly.
    pub fn payment_delta(amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositivePayment);
        }
        if !amount::fits(amount) {
            return Err(LedgerError::AmountOutOfRange(amount));
        }
        Ok(amount)
    }

    /// Starting balance of a new counterparty from its opening entries.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` if any opening amount is negative
    /// and `LedgerError::AmountOutOfRange` if an amount or the resulting
    /// balance cannot be stored exactly.
    pub fn opening_balance(entries: &[OpeningEntry]) -> Result<Decimal, LedgerError> {
        entries.iter().try_fold(Decimal::ZERO, |acc, entry| {
            Self::check_entry_amount(entry.amount)?;
            amount::add(acc, Self::signed_amount(entry.kind, entry.amount))
                .ok_or(LedgerError::AmountOutOfRange(entry.amount))
        })
    }

    fn check_entry_amount(value: Decimal) -> Result<(), LedgerError> {
        if value < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if !amount::fits(value) {
            return Err(LedgerError::AmountOutOfRange(value));
        }
        Ok(())
    }

    /// Balance implied by the live entries and payments.
    ///
    /// Saturates instead of overflowing.
    #[must_use]
    pub fn expected_balance(entries: &[LedgerEntry], payments: &[Decimal]) -> Decimal {
        entries
            .iter()
            .map(|e| Self::signed_amount(e.kind, e.amount))
            .chain(payments.iter().copied())
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Compares a stored balance with the ledger.
    #[must_use]
    pub fn audit(recorded: Decimal, entries: &[LedgerEntry], payments: &[Decimal]) -> BalanceAudit {
        let expected = Self::expected_balance(entries, payments);
        let drift = recorded.saturating_sub(expected);
        BalanceAudit {
            recorded,
            expected,
            drift,
            is_consistent: drift.is_zero(),
        }
    }
}
