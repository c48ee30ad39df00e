//! Collection error types.
//!
//! This module defines all error types that can occur during collection
//! operations: lifecycle transitions, payment recording, and allocation.

use rust_decimal::Decimal;
use thiserror::Error;
use utang_shared::types::{CollectionId, PaymentId, UserId, WalletId};

use crate::collection::types::{CollectionStatus, Role};

/// Errors that can occur during collection operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Payment would overshoot the remaining balance.
    #[error("Payment of {amount} exceeds the outstanding balance of {outstanding}")]
    ExceedsOutstanding {
        /// The attempted payment amount.
        amount: Decimal,
        /// The current outstanding balance.
        outstanding: Decimal,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: CollectionStatus,
        /// The attempted target status.
        to: CollectionStatus,
    },

    /// Payments are not accepted in the current status.
    #[error("Collection is {0}; payments are not accepted")]
    ClosedForPayments(CollectionStatus),

    /// Only the pending registered counterparty may respond.
    #[error("Only the registered counterparty may respond to this collection")]
    NotCounterparty,

    /// The actor occupies neither slot of the collection.
    #[error("User is not a participant of this collection")]
    NotParticipant,

    /// A pending collection may only be withdrawn by its creator.
    #[error("Only the creator may cancel a collection awaiting approval")]
    CancelRequiresCreator,

    /// This side has already been realized against a wallet.
    #[error("The {side} side of this payment has already been allocated")]
    AlreadyAllocated {
        /// The side that was already allocated.
        side: Role,
    },

    /// Wallet currency does not match the collection currency.
    #[error("Wallet currency {wallet} does not match collection currency {collection}")]
    CurrencyMismatch {
        /// The wallet's currency code.
        wallet: String,
        /// The collection's currency code.
        collection: String,
    },

    /// The counterparty reference could not be used.
    #[error("Invalid counterparty: {0}")]
    InvalidCounterparty(String),

    /// The referenced registered counterparty does not exist.
    #[error("Counterparty user {0} not found")]
    CounterpartyNotFound(UserId),

    /// The wallet belongs to a different user.
    #[error("Wallet belongs to a different user")]
    NotWalletOwner,

    /// Wallet not found.
    #[error("Wallet {0} not found")]
    WalletNotFound(WalletId),

    /// Collection not found.
    #[error("Collection {0} not found")]
    CollectionNotFound(CollectionId),

    /// Collection payment not found.
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CollectionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount | Self::InvalidCounterparty(_) => 400,

            Self::NotCounterparty
            | Self::NotParticipant
            | Self::CancelRequiresCreator
            | Self::NotWalletOwner => 403,

            Self::CounterpartyNotFound(_)
            | Self::WalletNotFound(_)
            | Self::CollectionNotFound(_)
            | Self::PaymentNotFound(_) => 404,

            Self::AlreadyAllocated { .. } => 409,

            Self::ExceedsOutstanding { .. }
            | Self::InvalidTransition { .. }
            | Self::ClosedForPayments(_)
            | Self::CurrencyMismatch { .. } => 422,

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::ExceedsOutstanding { .. } => "EXCEEDS_OUTSTANDING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ClosedForPayments(_) => "CLOSED_FOR_PAYMENTS",
            Self::NotCounterparty => "NOT_COUNTERPARTY",
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::CancelRequiresCreator => "CANCEL_REQUIRES_CREATOR",
            Self::AlreadyAllocated { .. } => "ALREADY_ALLOCATED",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidCounterparty(_) => "INVALID_COUNTERPARTY",
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::NotWalletOwner => "NOT_WALLET_OWNER",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::CollectionNotFound(_) => "COLLECTION_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
