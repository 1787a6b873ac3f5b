//! Inventory reconciliation.
//!
//! Turns a batch of per-product quantity adjustments into the concrete
//! changes to apply to stored inventory records:
//! - Adjustments for the same product are merged before checking
//! - Every adjustment is checked before any change is produced
//! - Records reaching zero are deleted or kept according to `ZeroStockPolicy`

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::InventoryError;
pub use service::InventoryService;
pub use stockbook_shared::types::ZeroStockPolicy;
pub use types::{PriceUpdate, StockAdjustment, StockChange, StockLevel};
