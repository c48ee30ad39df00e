//! Lifecycle state transitions for collections.
//!
//! This module implements the core state machine logic for moving a
//! collection through approval, payment, and cancellation.

use rust_decimal::Decimal;

use crate::collection::error::CollectionError;
use crate::collection::types::{CollectionStatus, Party};

/// Stateless service for collection lifecycle transitions.
///
/// All methods are associated functions that validate a transition against
/// the current status and return the new status, or an error leaving the
/// caller's state untouched.
pub struct LifecycleService;

impl LifecycleService {
    /// Validates the obligation amount at creation time.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidAmount` if the amount is not
    /// strictly positive.
    pub fn validate_amount(amount: Decimal) -> Result<(), CollectionError> {
        if amount <= Decimal::ZERO {
            return Err(CollectionError::InvalidAmount);
        }
        Ok(())
    }

    /// Returns the status a new collection is born with.
    ///
    /// A registered counterparty must consent, so the collection starts in
    /// `PendingApproval`. A manual counterparty has nobody to ask: the
    /// collection starts directly `Active`.
    #[must_use]
    pub const fn initial_status(counterparty: &Party) -> CollectionStatus {
        match counterparty {
            Party::Registered(_) => CollectionStatus::PendingApproval,
            Party::Manual(_) => CollectionStatus::Active,
        }
    }

    /// Applies the counterparty's response to a pending collection.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidTransition` if the collection is not
    /// awaiting approval.
    pub fn respond(
        current: CollectionStatus,
        accept: bool,
    ) -> Result<CollectionStatus, CollectionError> {
        let target = if accept {
            CollectionStatus::Active
        } else {
            CollectionStatus::Rejected
        };

        match current {
            CollectionStatus::PendingApproval => Ok(target),
            _ => Err(CollectionError::InvalidTransition {
                from: current,
                to: target,
            }),
        }
    }

    /// Validates a cancellation request.
    ///
    /// While awaiting approval only the creator may withdraw the record;
    /// once active either registered participant may cancel.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::CancelRequiresCreator` if a non-creator
    /// attempts to withdraw a pending collection, or
    /// `CollectionError::InvalidTransition` from a terminal status.
    pub fn cancel(
        current: CollectionStatus,
        is_creator: bool,
    ) -> Result<CollectionStatus, CollectionError> {
        match current {
            CollectionStatus::PendingApproval if is_creator => Ok(CollectionStatus::Cancelled),
            CollectionStatus::PendingApproval => Err(CollectionError::CancelRequiresCreator),
            CollectionStatus::Active | CollectionStatus::PartiallyPaid => {
                Ok(CollectionStatus::Cancelled)
            }
            _ => Err(CollectionError::InvalidTransition {
                from: current,
                to: CollectionStatus::Cancelled,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - `PendingApproval` → `Active` | `Rejected` | `Cancelled`
    /// - `Active` → `PartiallyPaid` | `Paid` | `Cancelled`
    /// - `PartiallyPaid` → `Paid` | `Cancelled`
    #[must_use]
    pub const fn is_valid_transition(from: CollectionStatus, to: CollectionStatus) -> bool {
        matches!(
            (from, to),
            (
                CollectionStatus::PendingApproval,
                CollectionStatus::Active | CollectionStatus::Rejected | CollectionStatus::Cancelled
            ) | (
                CollectionStatus::Active,
                CollectionStatus::PartiallyPaid
                    | CollectionStatus::Paid
                    | CollectionStatus::Cancelled
            ) | (
                CollectionStatus::PartiallyPaid,
                CollectionStatus::Paid | CollectionStatus::Cancelled
            )
        )
    }
}
