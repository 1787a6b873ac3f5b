//! Counterparty validation and name resolution.

use stockbook_shared::types::CounterpartyId;

use super::error::LedgerError;
use super::types::CounterpartyCandidate;
use crate::trade::TradeKind;

/// Stateless counterparty service.
pub struct CounterpartyService;

impl CounterpartyService {
    /// Trims and validates a counterparty name.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EmptyName` if the name is blank.
    pub fn validate_name(name: &str) -> Result<String, LedgerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        Ok(trimmed.to_string())
    }

    /// Trims and validates note text.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EmptyNote` if the text is blank.
    pub fn validate_note(text: &str) -> Result<String, LedgerError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::EmptyNote);
        }
        Ok(trimmed.to_string())
    }

    /// Resolves the counterparty named on a trade.
    ///
    /// Matching is exact on the trimmed name. A candidate whose role fits the
    /// trade kind (client for sales, supplier for purchases) wins over one with
    /// the other role. Returns `None` when nobody matches.
    #[must_use]
    pub fn resolve(
        name: &str,
        kind: TradeKind,
        candidates: &[CounterpartyCandidate],
    ) -> Option<CounterpartyId> {
        let name = name.trim();
        let preferred = kind.counterparty_role();

        let mut matching = candidates.iter().filter(|c| c.name == name);
        let first = matching.next()?;
        if first.role == preferred {
            return Some(first.id);
        }
        Some(
            matching
                .find(|c| c.role == preferred)
                .map_or(first.id, |c| c.id),
        )
    }
}
