//! Peer-to-peer debt/credit ("collection") management for Utang.
//!
//! A collection is a bilateral money obligation between a creditor and a
//! debtor. Either side may be a registered user or an unregistered "manual"
//! party known only by a label. This module implements the lifecycle state
//! machine, the partial-payment arithmetic, and the rules for converting a
//! logical payment into a real wallet movement on one side.
//!
//! # Modules
//!
//! - `types` - Domain types (Party, Role, CollectionStatus, Participants)
//! - `error` - Collection-specific error types
//! - `lifecycle` - State transition logic
//! - `ledger` - Outstanding balance and payment validation
//! - `allocation` - Per-side realization rules

pub mod allocation;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod types;

#[cfg(test)]
mod ledger_props;
#[cfg(test)]
mod lifecycle_props;

pub use allocation::{AllocationPlan, MovementKind, plan_allocation};
pub use error::CollectionError;
pub use ledger::{outstanding, settlement_tolerance, status_for_outstanding, validate_payment};
pub use lifecycle::LifecycleService;
pub use types::{CollectionStatus, Participants, Party, Role};
