//! Collection domain types.
//!
//! This module defines the core types for the bilateral debt/credit
//! lifecycle: the two participant slots, the actor roles, and the
//! collection status.

use serde::{Deserialize, Serialize};
use std::fmt;
use utang_shared::types::UserId;

use crate::collection::error::CollectionError;

/// One side of a collection: a registered user or a manual label.
///
/// A manual party has no account. It never participates in approval,
/// never receives notifications, and can never allocate a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// A registered user, referenced by id.
    Registered(UserId),
    /// An unregistered counterparty, represented only by a label.
    Manual(String),
}

impl Party {
    /// Returns true if this side is a registered user.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    /// Returns the registered user id, if any.
    #[must_use]
    pub const fn registered_id(&self) -> Option<UserId> {
        match self {
            Self::Registered(id) => Some(*id),
            Self::Manual(_) => None,
        }
    }
}

/// The role an actor occupies on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The party owed money.
    Creditor,
    /// The party owing money.
    Debtor,
}

impl Role {
    /// Returns the opposite role.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Creditor => Self::Debtor,
            Self::Debtor => Self::Creditor,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creditor => "creditor",
            Self::Debtor => "debtor",
        }
    }

    /// Parses a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "creditor" => Some(Self::Creditor),
            "debtor" => Some(Self::Debtor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection status in the debt/credit lifecycle.
///
/// The valid transitions are:
/// - `PendingApproval` → `Active` (counterparty accepts)
/// - `PendingApproval` → `Rejected` (counterparty declines)
/// - `PendingApproval` → `Cancelled` (creator withdraws)
/// - `Active` → `PartiallyPaid` (first payment, balance remains)
/// - `Active`/`PartiallyPaid` → `Paid` (balance settled)
/// - `Active`/`PartiallyPaid` → `Cancelled` (participant cancels)
///
/// A collection with a manual counterparty skips `PendingApproval` and is
/// created directly `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Waiting for the registered counterparty to accept or decline.
    PendingApproval,
    /// Accepted (or manual-counterparty); payments may be recorded.
    Active,
    /// Some payments recorded, balance remains.
    PartiallyPaid,
    /// Fully settled (terminal).
    Paid,
    /// Declined by the counterparty (terminal).
    Rejected,
    /// Cancelled by a participant (terminal).
    Cancelled,
}

impl CollectionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Active => "active",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending_approval" => Some(Self::PendingApproval),
            "active" => Some(Self::Active),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further payments or transitions are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Rejected | Self::Cancelled)
    }

    /// Returns true if payments may be recorded in this status.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        matches!(self, Self::Active | Self::PartiallyPaid)
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two participant slots of a collection.
///
/// At least one slot holds the creating user's own registered identity;
/// the other is either a second registered party or a manual label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    /// The creditor slot.
    pub creditor: Party,
    /// The debtor slot.
    pub debtor: Party,
}

impl Participants {
    /// Builds the participant pair with `actor` occupying `role` and the
    /// counterparty on the opposite slot.
    #[must_use]
    pub fn with_actor(role: Role, actor: UserId, counterparty: Party) -> Self {
        match role {
            Role::Creditor => Self {
                creditor: Party::Registered(actor),
                debtor: counterparty,
            },
            Role::Debtor => Self {
                creditor: counterparty,
                debtor: Party::Registered(actor),
            },
        }
    }

    /// Returns the party occupying the given role.
    #[must_use]
    pub const fn party(&self, role: Role) -> &Party {
        match role {
            Role::Creditor => &self.creditor,
            Role::Debtor => &self.debtor,
        }
    }

    /// Resolves which role a user occupies, if any.
    ///
    /// A manual slot can never match: it has no user id.
    #[must_use]
    pub fn role_of(&self, user: UserId) -> Option<Role> {
        if self.creditor.registered_id() == Some(user) {
            Some(Role::Creditor)
        } else if self.debtor.registered_id() == Some(user) {
            Some(Role::Debtor)
        } else {
            None
        }
    }

    /// Returns the registered user on the opposite slot of `role`, if any.
    #[must_use]
    pub fn other_registered(&self, role: Role) -> Option<UserId> {
        self.party(role.opposite()).registered_id()
    }

    /// Validates the pair for creation by `creator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the creator occupies neither slot, if both slots
    /// reference the same user, or if a manual label is blank.
    pub fn validate(&self, creator: UserId) -> Result<(), CollectionError> {
        if self.role_of(creator).is_none() {
            return Err(CollectionError::NotParticipant);
        }

        if let (Some(c), Some(d)) = (self.creditor.registered_id(), self.debtor.registered_id())
            && c == d
        {
            return Err(CollectionError::InvalidCounterparty(
                "creditor and debtor cannot be the same user".to_string(),
            ));
        }

        for party in [&self.creditor, &self.debtor] {
            if let Party::Manual(label) = party
                && label.trim().is_empty()
            {
                return Err(CollectionError::InvalidCounterparty(
                    "manual party label cannot be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}
