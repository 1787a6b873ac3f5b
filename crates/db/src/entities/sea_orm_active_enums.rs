//! `SeaORM` active enums, stored as short strings so the schema stays portable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use stockbook_core::counterparty::CounterpartyRole as CoreCounterpartyRole;
use stockbook_core::trade::TradeKind as CoreTradeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyRole {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "supplier")]
    Supplier,
}

impl From<CoreTradeKind> for TradeKind {
    fn from(kind: CoreTradeKind) -> Self {
        match kind {
            CoreTradeKind::Sale => Self::Sale,
            CoreTradeKind::Purchase => Self::Purchase,
        }
    }
}

impl From<TradeKind> for CoreTradeKind {
    fn from(kind: TradeKind) -> Self {
        match kind {
            TradeKind::Sale => Self::Sale,
            TradeKind::Purchase => Self::Purchase,
        }
    }
}

impl From<CoreCounterpartyRole> for CounterpartyRole {
    fn from(role: CoreCounterpartyRole) -> Self {
        match role {
            CoreCounterpartyRole::Client => Self::Client,
            CoreCounterpartyRole::Supplier => Self::Supplier,
        }
    }
}

impl From<CounterpartyRole> for CoreCounterpartyRole {
    fn from(role: CounterpartyRole) -> Self {
        match role {
            CounterpartyRole::Client => Self::Client,
            CounterpartyRole::Supplier => Self::Supplier,
        }
    }
}
