//! Trade error types.
//!
//! Errors raised while validating a sale or purchase and while applying it to
//! inventory and the counterparty ledger. Inventory and ledger failures are
//! wrapped so one error type flows out of every mutation.

use stockbook_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::counterparty::LedgerError;
use crate::inventory::InventoryError;

/// Errors that can occur during sale and purchase operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    // ========== Validation Errors ==========
    /// A trade needs at least one line.
    #[error("Trade must have at least one line")]
    EmptyLines,

    /// A required line field is missing.
    #[error("Line {line}: {field} is required")]
    MissingField {
        /// Zero-based line index.
        line: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Quantity must be strictly positive with at most four decimal places.
    #[error("Line {line}: quantity must be greater than zero with at most 4 decimal places")]
    InvalidQuantity {
        /// Zero-based line index.
        line: usize,
    },

    /// Unit price must be strictly positive with at most four decimal places.
    #[error("Line {line}: unit price must be greater than zero with at most 4 decimal places")]
    InvalidPrice {
        /// Zero-based line index.
        line: usize,
    },

    /// A line value is too large to store.
    #[error("Line {line}: {field} is out of range")]
    LineOutOfRange {
        /// Zero-based line index.
        line: usize,
        /// `quantity`, `unit_price` or `line_total`.
        field: &'static str,
    },

    /// The sum of line totals is too large to store.
    #[error("Trade total is out of range")]
    TotalOutOfRange,

    /// Counterparty name is blank.
    #[error("Counterparty name cannot be empty")]
    EmptyCounterpartyName,

    // ========== Collaborator Errors ==========
    /// Inventory rejected the adjustment.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Ledger rejected the entry.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // ========== Lookup Errors ==========
    /// Sale or purchase not found.
    #[error("Trade not found: {0}")]
    TradeNotFound(Uuid),

    // ========== Concurrency Errors ==========
    /// A row changed between read and write.
    #[error("Concurrent modification of {0}, retry the request")]
    ConcurrentModification(String),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl TradeError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLines => "EMPTY_LINES",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::InvalidPrice { .. } => "INVALID_PRICE",
            Self::LineOutOfRange { .. } | Self::TotalOutOfRange => "VALUE_OUT_OF_RANGE",
            Self::EmptyCounterpartyName => "EMPTY_COUNTERPARTY_NAME",
            Self::Inventory(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::TradeNotFound(_) => "TRADE_NOT_FOUND",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyLines
            | Self::MissingField { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidPrice { .. }
            | Self::LineOutOfRange { .. }
            | Self::TotalOutOfRange
            | Self::EmptyCounterpartyName => 400,
            Self::Inventory(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::TradeNotFound(_) => 404,
            Self::ConcurrentModification(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the same request may succeed when sent again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

impl From<TradeError> for AppError {
    fn from(err: TradeError) -> Self {
        let message = err.to_string();
        match err {
            TradeError::Inventory(e) => e.into(),
            TradeError::Ledger(e) => e.into(),
            TradeError::TradeNotFound(_) => Self::NotFound(message),
            TradeError::ConcurrentModification(_) => Self::ConcurrentModification(message),
            TradeError::Database(_) => Self::Database(message),
            TradeError::EmptyLines
            | TradeError::MissingField { .. }
            | TradeError::InvalidQuantity { .. }
            | TradeError::InvalidPrice { .. }
            | TradeError::LineOutOfRange { .. }
            | TradeError::TotalOutOfRange
            | TradeError::EmptyCounterpartyName => Self::Validation(message),
        }
    }
}
