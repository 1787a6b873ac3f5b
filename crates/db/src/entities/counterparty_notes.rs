//! `SeaORM` Entity for counterparty_notes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "counterparty_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub counterparty_id: Uuid,
    pub text: String,
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
