//! `SeaORM` Entity for collection_payments table.
//!
//! A payment row is immutable except for its two allocation
//! back-references, each set at most once and never cleared.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "collection_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection_id: Uuid,
    pub amount: Decimal,
    pub paid_at: DateTimeWithTimeZone,
    pub notes: Option<String>,
    pub creditor_income_id: Option<Uuid>,
    pub debtor_expense_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::collections::Entity",
        from = "Column::CollectionId",
        to = "super::collections::Column::Id"
    )]
    Collections,
    #[sea_orm(
        belongs_to = "super::incomes::Entity",
        from = "Column::CreditorIncomeId",
        to = "super::incomes::Column::Id"
    )]
    CreditorIncome,
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::DebtorExpenseId",
        to = "super::expenses::Column::Id"
    )]
    DebtorExpense,
}

impl Related<super::collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
