//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub merchant: String,
    pub category_raw: String,
    pub category_normalized: String,
    pub occurred_at: DateTimeWithTimeZone,
    pub source: String,
    /// Caller-supplied idempotence key; unique across all transactions.
    pub dedup_token: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::savings_ledger::Entity")]
    SavingsLedger,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::savings_ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsLedger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
