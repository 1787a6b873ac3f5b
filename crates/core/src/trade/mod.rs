//! Sale and purchase orchestration logic.
//!
//! This module owns everything the mutation handlers decide before touching
//! storage: line validation and pricing, the inventory adjustments implied by
//! a create/edit/delete, and the ledger entry describing the trade.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::TradeError;
pub use service::TradeService;
pub use types::{TradeKind, TradeLine, TradeLineInput};
