//! Counterparty domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockbook_shared::types::{CounterpartyId, LedgerEntryId, TradeId};

use crate::trade::{TradeKind, TradeLine};

/// Which side of the business a counterparty is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyRole {
    /// Buys from us.
    Client,
    /// Sells to us.
    Supplier,
}

impl std::fmt::Display for CounterpartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Supplier => write!(f, "supplier"),
        }
    }
}

impl std::str::FromStr for CounterpartyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "supplier" => Ok(Self::Supplier),
            _ => Err(format!("Unknown counterparty role: {s}")),
        }
    }
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: LedgerEntryId,
    /// Sale or purchase.
    pub kind: TradeKind,
    /// Unsigned amount; the sign comes from `kind`.
    pub amount: Decimal,
    /// When the underlying trade happened.
    pub occurred_at: DateTime<Utc>,
    /// Lines of the trade at the time the entry was written.
    pub lines: Vec<TradeLine>,
    /// Trade that produced this entry. `None` for opening entries.
    pub source_trade_id: Option<TradeId>,
}

/// What the orchestrator wants recorded for a trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Sale or purchase.
    pub kind: TradeKind,
    /// Trade total.
    pub amount: Decimal,
    /// When the trade happened.
    pub occurred_at: DateTime<Utc>,
    /// Line snapshot.
    pub lines: Vec<TradeLine>,
    /// Trade this entry is linked to.
    pub source_trade_id: TradeId,
}

/// An opening entry supplied when a counterparty is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningEntry {
    /// Sale or purchase.
    pub kind: TradeKind,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Defaults to the creation time.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Minimal view of a counterparty used for name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyCandidate {
    /// Counterparty ID.
    pub id: CounterpartyId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: CounterpartyRole,
}

/// The write a ledger operation resolves to, with the balance delta to apply
/// to the owning counterparty in the same unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerAction {
    /// Store a new entry.
    Insert {
        /// Owning counterparty.
        counterparty_id: CounterpartyId,
        /// Entry to store.
        entry: LedgerEntry,
        /// Amount to add to the balance.
        balance_delta: Decimal,
    },
    /// Overwrite an existing entry in place, keeping its ID.
    Overwrite {
        /// Owning counterparty.
        counterparty_id: CounterpartyId,
        /// New content of the entry.
        entry: LedgerEntry,
        /// Amount to add to the balance.
        balance_delta: Decimal,
    },
    /// Delete an entry.
    Remove {
        /// Owning counterparty.
        counterparty_id: CounterpartyId,
        /// Entry to delete.
        entry_id: LedgerEntryId,
        /// Amount to add to the balance.
        balance_delta: Decimal,
    },
    /// Nothing to do (no counterparty, or no entry to reverse).
    Skip,
}

impl LedgerAction {
    /// Balance delta carried by this action, zero for `Skip`.
    #[must_use]
    pub fn balance_delta(&self) -> Decimal {
        match self {
            Self::Insert { balance_delta, .. }
            | Self::Overwrite { balance_delta, .. }
            | Self::Remove { balance_delta, .. } => *balance_delta,
            Self::Skip => Decimal::ZERO,
        }
    }
}
