//! Inventory error types.

use rust_decimal::Decimal;
use stockbook_shared::AppError;
use thiserror::Error;

/// Errors that can occur while planning inventory adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// An adjustment would drive a product's quantity below zero.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The offending product.
        product: String,
        /// Quantity on hand when the adjustment was checked.
        available: Decimal,
        /// Quantity the adjustment tried to remove.
        requested: Decimal,
    },

    /// Product name is blank.
    #[error("Product name cannot be empty")]
    EmptyProductName,

    /// Resulting quantity or stock value is too large to store.
    #[error("Stock of {product} would be out of range")]
    OutOfRange {
        /// The offending product.
        product: String,
    },

    /// A new price must be strictly positive.
    #[error("Invalid unit price {price} for {product}")]
    InvalidPrice {
        /// The offending product.
        product: String,
        /// The rejected price.
        price: Decimal,
    },
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::EmptyProductName => "EMPTY_PRODUCT_NAME",
            Self::InvalidPrice { .. } => "INVALID_PRICE",
            Self::OutOfRange { .. } => "VALUE_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientStock { .. } => 422,
            Self::EmptyProductName | Self::InvalidPrice { .. } | Self::OutOfRange { .. } => 400,
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let message = err.to_string();
        match err {
            InventoryError::InsufficientStock { .. } => Self::BusinessRule(message),
            InventoryError::EmptyProductName
            | InventoryError::InvalidPrice { .. }
            | InventoryError::OutOfRange { .. } => Self::Validation(message),
        }
    }
}
