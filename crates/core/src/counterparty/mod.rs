//! Counterparty ledger logic.
//!
//! This module implements the running-balance bookkeeping for clients and
//! suppliers:
//! - Ledger entries linked 1:1 to the sale or purchase that produced them
//! - Append / replace / reverse of entries with the matching balance delta
//! - Payments
//! - Balance audit against the live entries and payments
//! - Counterparty validation and name resolution

pub mod error;
pub mod ledger;
pub mod service;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use error::LedgerError;
pub use ledger::{BalanceAudit, LedgerService};
pub use service::CounterpartyService;
pub use types::{
    CounterpartyCandidate, CounterpartyRole, EntryDraft, LedgerAction, LedgerEntry, OpeningEntry,
};
