//! Database enum types mapped to PostgreSQL enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collection status in the debt/credit lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "collection_status")]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Waiting for the registered counterparty to accept or decline.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Accepted; payments may be recorded.
    #[sea_orm(string_value = "active")]
    Active,
    /// Some payments recorded, balance remains.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Fully settled (terminal).
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Declined by the counterparty (terminal).
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Cancelled by a participant (terminal).
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
