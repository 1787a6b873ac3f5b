//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod counterparty;
pub mod inventory;
pub mod trade;

pub use counterparty::{
    CounterpartyRepository, CreateCounterpartyInput, RecordPaymentInput, UpdateCounterpartyInput,
};
pub use inventory::InventoryRepository;
pub use trade::{TradeFilter, TradeInput, TradeRepository, TradeWithLines};
