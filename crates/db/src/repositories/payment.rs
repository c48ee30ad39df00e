//! Payment ledger repository.
//!
//! Owns the append-only sequence of partial payments against a collection.
//! The overshoot check is enforced atomically: the collection row is locked
//! (`SELECT ... FOR UPDATE`) in the same transaction that sums prior
//! payments, inserts the new one, and recomputes the status, so two
//! concurrent payments that each fit the balance cannot jointly overshoot.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use utang_core::collection::{CollectionError, ledger};
use utang_core::notify::Notifier;
use utang_shared::types::UserId;

use crate::entities::{collection_payments, collections};
use crate::repositories::allocation::allocate_in_txn;
use crate::repositories::collection::{
    core_status_to_db, db_err, db_status_to_core, find_locked, participants_of,
};

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// The collection being paid against.
    pub collection_id: Uuid,
    /// The participant recording the payment.
    pub actor_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When set, the actor's own side is allocated against this wallet
    /// before returning.
    pub wallet_id: Option<Uuid>,
}

/// Payment repository for the collection ledger.
#[derive(Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Records a partial payment against a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or closed for
    /// payments, the actor is not a registered participant, the amount is
    /// not positive or overshoots the outstanding balance, or the database
    /// operation fails.
    pub async fn record_payment(
        &self,
        input: RecordPaymentInput,
    ) -> Result<collection_payments::Model, CollectionError> {
        self.append(
            input.collection_id,
            input.actor_id,
            Some(input.amount),
            input.notes,
            input.wallet_id,
        )
        .await
    }

    /// Settles the remaining balance in one payment.
    ///
    /// Equivalent to `record_payment` with the current outstanding balance
    /// as the amount, transitioning the collection directly to `paid`.
    ///
    /// # Errors
    ///
    /// Same failure modes as `record_payment`.
    pub async fn mark_fully_paid(
        &self,
        collection_id: Uuid,
        actor_id: Uuid,
        wallet_id: Option<Uuid>,
    ) -> Result<collection_payments::Model, CollectionError> {
        self.append(collection_id, actor_id, None, None, wallet_id).await
    }

    /// Appends a payment row; `amount = None` settles the remainder.
    async fn append(
        &self,
        collection_id: Uuid,
        actor_id: Uuid,
        amount: Option<Decimal>,
        notes: Option<String>,
        wallet_id: Option<Uuid>,
    ) -> Result<collection_payments::Model, CollectionError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock serializes the balance check against concurrent appends.
        let collection = find_locked(&txn, collection_id).await?;
        let participants = participants_of(&collection);
        let role = participants
            .role_of(UserId::from_uuid(actor_id))
            .ok_or(CollectionError::NotParticipant)?;

        let status = db_status_to_core(&collection.status);
        if !status.accepts_payments() {
            return Err(CollectionError::ClosedForPayments(status));
        }

        let prior = collection_payments::Entity::find()
            .filter(collection_payments::Column::CollectionId.eq(collection.id))
            .all(&txn)
            .await
            .map_err(db_err)?;
        let paid_total: Decimal = prior.iter().map(|p| p.amount).sum();
        let remaining = ledger::outstanding(collection.amount, paid_total);

        let amount = amount.unwrap_or(remaining);
        ledger::validate_payment(amount, remaining)?;

        let now = Utc::now().into();
        let payment = collection_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            collection_id: Set(collection.id),
            amount: Set(amount),
            paid_at: Set(now),
            notes: Set(notes),
            creditor_income_id: Set(None),
            debtor_expense_id: Set(None),
            created_at: Set(now),
        };
        let mut payment = payment.insert(&txn).await.map_err(db_err)?;

        // Common case: the recording actor is the one whose cash moved.
        if let Some(wallet) = wallet_id {
            payment = allocate_in_txn(&txn, &collection, payment, actor_id, wallet).await?;
        }

        let new_status = ledger::status_for_outstanding(remaining - amount);
        let currency = collection.currency.clone();
        let mut active: collections::ActiveModel = collection.into();
        active.status = Set(core_status_to_db(new_status));
        active.updated_at = Set(now);
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        // Deep-link the other participant to their pending allocation.
        if let Some(other) = participants.other_registered(role) {
            let body = format!("A payment of {amount} {currency} was recorded");
            let link = format!("/collections/{collection_id}/payments/{}", payment.id);
            if let Err(e) = self
                .notifier
                .notify(other, "Payment recorded", &body, &link)
                .await
            {
                warn!(error = %e, recipient = %other, "notification dispatch failed");
            }
        }

        Ok(payment)
    }
}
