//! `SeaORM` Entity for collections table.
//!
//! A collection is a bilateral money obligation. Each participant slot is
//! either a registered user id or a free-text manual label; the database
//! enforces exactly one of the two per slot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CollectionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub creditor_id: Option<Uuid>,
    pub creditor_name: Option<String>,
    pub debtor_id: Option<Uuid>,
    pub debtor_name: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub status: CollectionStatus,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::collection_payments::Entity")]
    CollectionPayments,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::collection_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionPayments.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
