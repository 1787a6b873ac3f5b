//! `SeaORM` Entity for counterparty_ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TradeKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "counterparty_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub counterparty_id: Uuid,
    pub kind: TradeKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub occurred_at: DateTimeWithTimeZone,
    /// Line snapshot at the time the entry was written.
    pub lines: Json,
    #[sea_orm(unique)]
    pub source_trade_id: Option<Uuid>,
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
}

impl Related<super::counterparties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
