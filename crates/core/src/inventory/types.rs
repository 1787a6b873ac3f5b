//! Inventory domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current stock state of one product, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Product name (unique within a period).
    pub product_name: String,
    /// Quantity on hand, never negative.
    pub quantity: Decimal,
    /// Last recorded unit price.
    pub unit_price: Decimal,
}

impl StockLevel {
    /// Creates a stock level snapshot.
    #[must_use]
    pub fn new(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }
}

/// How an adjustment affects the stored unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceUpdate {
    /// Overwrite the stored price (purchases).
    Reprice(Decimal),
    /// Keep the stored price. `fallback` is used when the record has to be created.
    Keep {
        /// Price for a newly created record.
        fallback: Decimal,
    },
}

impl PriceUpdate {
    /// Resolves the price to store given the current one, if any.
    #[must_use]
    pub fn resolve(self, current: Option<Decimal>) -> Decimal {
        match (self, current) {
            (Self::Reprice(price), _) => price,
            (Self::Keep { .. }, Some(current)) => current,
            (Self::Keep { fallback }, None) => fallback,
        }
    }

    /// Combines two updates for the same product, the later one taking precedence.
    ///
    /// A reprice is never overridden by a keep.
    #[must_use]
    pub fn then(self, later: Self) -> Self {
        match (self, later) {
            (Self::Reprice(price), Self::Keep { .. }) => Self::Reprice(price),
            (_, later) => later,
        }
    }
}

/// A signed quantity change for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    /// Product name.
    pub product_name: String,
    /// Positive to add stock, negative to remove it.
    pub quantity_delta: Decimal,
    /// Price handling for this adjustment.
    pub price: PriceUpdate,
}

impl StockAdjustment {
    /// Stock coming in at a new price.
    #[must_use]
    pub fn restock(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity_delta: quantity,
            price: PriceUpdate::Reprice(unit_price),
        }
    }

    /// Stock going out; the stored price is left alone.
    #[must_use]
    pub fn withdraw(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity_delta: -quantity,
            price: PriceUpdate::Keep {
                fallback: unit_price,
            },
        }
    }

    /// Stock coming back (e.g., a deleted sale); the stored price is left alone.
    #[must_use]
    pub fn restore(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity_delta: quantity,
            price: PriceUpdate::Keep {
                fallback: unit_price,
            },
        }
    }
}

/// A concrete write against the inventory store.
///
/// `previous_quantity` is the quantity the plan was computed against; writers
/// use it as a compare-and-set guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockChange {
    /// Create a record for a product with no stock on hand.
    Insert {
        /// Product name.
        product_name: String,
        /// New quantity.
        quantity: Decimal,
        /// Unit price.
        unit_price: Decimal,
        /// `quantity × unit_price` at storage scale.
        total_value: Decimal,
    },
    /// Overwrite quantity and price of an existing record.
    Update {
        /// Product name.
        product_name: String,
        /// Quantity the change was planned against.
        previous_quantity: Decimal,
        /// New quantity.
        quantity: Decimal,
        /// New unit price.
        unit_price: Decimal,
        /// `quantity × unit_price` at storage scale.
        total_value: Decimal,
    },
    /// Delete a record whose quantity reached zero.
    Remove {
        /// Product name.
        product_name: String,
        /// Quantity the change was planned against.
        previous_quantity: Decimal,
    },
}

impl StockChange {
    /// Product this change applies to.
    #[must_use]
    pub fn product_name(&self) -> &str {
        match self {
            Self::Insert { product_name, .. }
            | Self::Update { product_name, .. }
            | Self::Remove { product_name, .. } => product_name,
        }
    }

    /// Quantity on hand after the change.
    #[must_use]
    pub fn resulting_quantity(&self) -> Decimal {
        match self {
            Self::Insert { quantity, .. } | Self::Update { quantity, .. } => *quantity,
            Self::Remove { .. } => Decimal::ZERO,
        }
    }

    /// Stored value after the change.
    #[must_use]
    pub fn total_value(&self) -> Decimal {
        match self {
            Self::Insert { total_value, .. } | Self::Update { total_value, .. } => *total_value,
            Self::Remove { .. } => Decimal::ZERO,
        }
    }
}
