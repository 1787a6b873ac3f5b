//! `SeaORM` Entity for trades table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TradeKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: TradeKind,
    /// Name as entered on the trade.
    pub counterparty_name: String,
    /// Counterparty resolved when the trade was created or last edited.
    pub counterparty_id: Option<Uuid>,
    pub occurred_at: DateTimeWithTimeZone,
    pub period: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counterparties::Entity",
        from = "Column::CounterpartyId",
        to = "super::counterparties::Column::Id"
    )]
    Counterparties,
    #[sea_orm(has_many = "super::trade_lines::Entity")]
    TradeLines,
}

impl Related<super::counterparties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparties.def()
    }
}

impl Related<super::trade_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
