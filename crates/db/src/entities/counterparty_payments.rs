//! `SeaORM` Entity for counterparty_payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "counterparty_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub counterparty_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub paid_at: DateTimeWithTimeZone,
    pub memo: Option<String>,
    pub created_at: DateTimeWithTimeZone,
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
