//! Per-side allocation rules.
//!
//! Allocation converts a logical collection payment into a real wallet
//! movement for exactly one side: an income for the creditor, an expense
//! for the debtor. The two sides are fully independent and each may be
//! allocated at most once, ever.

use rust_decimal::Decimal;
use utang_shared::types::UserId;

use crate::collection::error::CollectionError;
use crate::collection::types::{Participants, Role};

/// The kind of realized movement an allocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    /// Money received by the creditor.
    Income,
    /// Money paid out by the debtor.
    Expense,
}

/// A validated allocation, ready to be applied atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPlan {
    /// The side being realized.
    pub side: Role,
    /// The movement record to create.
    pub kind: MovementKind,
    /// The signed delta to apply to the wallet balance.
    pub wallet_delta: Decimal,
}

/// Resolves the actor's side of a payment and validates that it can still
/// be allocated.
///
/// `creditor_allocated` / `debtor_allocated` reflect whether the payment's
/// back-references are already set. Callers must hold the payment row lock
/// while reading them so the at-most-once check is atomic with the write.
///
/// # Errors
///
/// - `CollectionError::NotParticipant` if the actor occupies neither
///   registered slot. A manual slot can never be allocated: it has no user
///   to act on its behalf, so no actor ever resolves to it.
/// - `CollectionError::AlreadyAllocated` if the actor's side has already
///   been realized.
pub fn plan_allocation(
    participants: &Participants,
    actor: UserId,
    amount: Decimal,
    creditor_allocated: bool,
    debtor_allocated: bool,
) -> Result<AllocationPlan, CollectionError> {
    let side = participants
        .role_of(actor)
        .ok_or(CollectionError::NotParticipant)?;

    let taken = match side {
        Role::Creditor => creditor_allocated,
        Role::Debtor => debtor_allocated,
    };
    if taken {
        return Err(CollectionError::AlreadyAllocated { side });
    }

    let (kind, wallet_delta) = match side {
        Role::Creditor => (MovementKind::Income, amount),
        Role::Debtor => (MovementKind::Expense, -amount),
    };

    Ok(AllocationPlan {
        side,
        kind,
        wallet_delta,
    })
}
