//! Trade domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount;
use crate::counterparty::CounterpartyRole;

/// Kind of business event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Goods sold to a client.
    Sale,
    /// Goods bought from a supplier.
    Purchase,
}

impl TradeKind {
    /// Counterparty role normally on the other side of this kind of trade.
    #[must_use]
    pub const fn counterparty_role(self) -> CounterpartyRole {
        match self {
            Self::Sale => CounterpartyRole::Client,
            Self::Purchase => CounterpartyRole::Supplier,
        }
    }
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Purchase => write!(f, "purchase"),
        }
    }
}

impl std::str::FromStr for TradeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sale" => Ok(Self::Sale),
            "purchase" => Ok(Self::Purchase),
            _ => Err(format!("Unknown trade kind: {s}")),
        }
    }
}

/// A product line as submitted by a caller. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLineInput {
    /// Product name.
    pub product_name: Option<String>,
    /// Quantity, strictly positive.
    pub quantity: Option<Decimal>,
    /// Unit price, strictly positive.
    pub unit_price: Option<Decimal>,
}

impl TradeLineInput {
    /// Builds a fully populated line.
    #[must_use]
    pub fn new(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_name: Some(product_name.into()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }
}

/// A validated and priced product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLine {
    /// Product name, trimmed.
    pub product_name: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub line_total: Decimal,
}

impl TradeLine {
    /// Prices a line, rounding the total to storage scale.
    ///
    /// Returns `None` if the total is out of storage range.
    #[must_use]
    pub fn priced(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Option<Self> {
        Some(Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
            line_total: amount::value_of(quantity, unit_price)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn new(product_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self::priced(product_name, quantity, unit_price).expect("line total in range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_trade_kind_display_and_parse() {
        assert_eq!(TradeKind::Sale.to_string(), "sale");
        assert_eq!(TradeKind::from_str("PURCHASE").unwrap(), TradeKind::Purchase);
        assert!(TradeKind::from_str("refund").is_err());
    }

    #[test]
    fn test_counterparty_role_for_kind() {
        assert_eq!(TradeKind::Sale.counterparty_role(), CounterpartyRole::Client);
        assert_eq!(TradeKind::Purchase.counterparty_role(), CounterpartyRole::Supplier);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(TradeLine::new("A", dec!(3), dec!(2.50)).line_total, dec!(7.50));
        assert_eq!(TradeLine::new("A", dec!(0.0003), dec!(0.5)).line_total, dec!(0.0002));
    }

    #[test]
    fn test_line_total_out_of_range() {
        assert!(TradeLine::priced("A", dec!(100_000_000_000_000_000_000), dec!(10_000_000_000)).is_none());
        assert!(TradeLine::priced("A", dec!(100_000_000), dec!(10_000_000)).is_none());
    }

    #[test]
    fn test_line_input_accepts_missing_fields() {
        let input: TradeLineInput = serde_json::from_str(r#"{"product_name":"A"}"#).unwrap();
        assert_eq!(input.product_name.as_deref(), Some("A"));
        assert!(input.quantity.is_none());
        assert!(input.unit_price.is_none());
    }
}
