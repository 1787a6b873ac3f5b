//! Inventory retention policy.

use serde::{Deserialize, Serialize};

/// What happens to an inventory record once its quantity reaches zero.
///
/// Deleting the record loses the last known unit price for the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroStockPolicy {
    /// Remove the record when its quantity drops to zero.
    #[default]
    Delete,
    /// Keep the record with a zero quantity and its last price.
    Retain,
}

impl std::fmt::Display for ZeroStockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Retain => write!(f, "retain"),
        }
    }
}

impl std::str::FromStr for ZeroStockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "retain" => Ok(Self::Retain),
            _ => Err(format!("Unknown zero stock policy: {s}")),
        }
    }
}
