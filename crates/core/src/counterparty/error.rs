//! Counterparty ledger error types.

use rust_decimal::Decimal;
use stockbook_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::trade::TradeKind;

/// Errors that can occur during counterparty and ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry amount cannot be negative.
    #[error("Ledger entry amount cannot be negative")]
    NegativeAmount,

    /// Payments must be strictly positive.
    #[error("Payment amount must be greater than zero")]
    NonPositivePayment,

    /// Amount has more than four decimal places or is too large to store.
    #[error("Amount {0} must have at most 4 decimal places and stay below 10^15")]
    AmountOutOfRange(Decimal),

    /// Counterparty name is blank.
    #[error("Counterparty name cannot be empty")]
    EmptyName,

    /// Note text is blank.
    #[error("Note text cannot be empty")]
    EmptyNote,

    /// An entry cannot change between sale and purchase.
    #[error("Ledger entry kind mismatch: stored {stored}, requested {requested}")]
    KindMismatch {
        /// Kind of the stored entry.
        stored: TradeKind,
        /// Kind of the requested replacement.
        requested: TradeKind,
    },

    // ========== Lookup Errors ==========
    /// Counterparty not found.
    #[error("Counterparty not found: {0}")]
    CounterpartyNotFound(Uuid),

    /// Note not found.
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// A counterparty with the same name and role already exists.
    #[error("A {role} named {name} already exists")]
    DuplicateCounterparty {
        /// Name.
        name: String,
        /// Role.
        role: String,
    },

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NonPositivePayment => "NON_POSITIVE_PAYMENT",
            Self::AmountOutOfRange(_) => "VALUE_OUT_OF_RANGE",
            Self::EmptyName => "EMPTY_NAME",
            Self::EmptyNote => "EMPTY_NOTE",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::NoteNotFound(_) => "NOTE_NOT_FOUND",
            Self::DuplicateCounterparty { .. } => "DUPLICATE_COUNTERPARTY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeAmount
            | Self::NonPositivePayment
            | Self::AmountOutOfRange(_)
            | Self::EmptyName
            | Self::EmptyNote
            | Self::KindMismatch { .. } => 400,
            Self::CounterpartyNotFound(_) | Self::NoteNotFound(_) => 404,
            Self::DuplicateCounterparty { .. } => 409,
            Self::Database(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::CounterpartyNotFound(_) | LedgerError::NoteNotFound(_) => {
                Self::NotFound(message)
            }
            LedgerError::DuplicateCounterparty { .. } => Self::Conflict(message),
            LedgerError::Database(_) => Self::Database(message),
            LedgerError::NegativeAmount
            | LedgerError::NonPositivePayment
            | LedgerError::AmountOutOfRange(_)
            | LedgerError::EmptyName
            | LedgerError::EmptyNote
            | LedgerError::KindMismatch { .. } => Self::Validation(message),
        }
    }
}
