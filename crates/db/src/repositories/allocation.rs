//! Allocation repository: converts a logical payment into a real wallet
//! movement for one side.
//!
//! The payment row is locked (`SELECT ... FOR UPDATE`) for the whole
//! conversion, so the at-most-once check on the back-reference is atomic
//! with the write that sets it. The movement insert, the wallet balance
//! adjustment, and the back-reference write commit together or not at all:
//! a failed wallet adjustment can never leave a dangling back-reference.

use sea_orm::{DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, Set, TransactionTrait};
use sea_orm::ActiveModelTrait;
use uuid::Uuid;

use utang_core::collection::allocation::MovementKind;
use utang_core::collection::{CollectionError, Role, plan_allocation};
use utang_shared::types::{CollectionId, PaymentId, UserId};

use crate::entities::{collection_payments, collections};
use crate::repositories::collection::{db_err, participants_of};
use crate::repositories::wallet::{CreateMovementInput, WalletRepository};

/// Allocation repository for per-side payment realization.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    db: DatabaseConnection,
}

impl AllocationRepository {
    /// Creates a new allocation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates the actor's side of a payment against one of their wallets.
    ///
    /// The two sides of a payment are fully independent: allocating one
    /// neither requires nor blocks the other.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not found, the actor occupies
    /// neither registered slot, the side is already allocated, the wallet
    /// is missing or foreign, or the database operation fails.
    pub async fn allocate(
        &self,
        payment_id: Uuid,
        actor_id: Uuid,
        wallet_id: Uuid,
    ) -> Result<collection_payments::Model, CollectionError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let payment = collection_payments::Entity::find_by_id(payment_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| CollectionError::PaymentNotFound(PaymentId::from_uuid(payment_id)))?;

        let collection = collections::Entity::find_by_id(payment.collection_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                CollectionError::CollectionNotFound(CollectionId::from_uuid(payment.collection_id))
            })?;

        let updated = allocate_in_txn(&txn, &collection, payment, actor_id, wallet_id).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }
}

/// Performs the allocation inside an already-open transaction.
///
/// Shared by the explicit `allocate` operation and by payment recording
/// when the recording actor names a wallet inline. The caller must hold
/// the payment row lock (explicit allocation) or be inserting the payment
/// in the same transaction (inline allocation), so the idempotency check
/// cannot race.
pub(crate) async fn allocate_in_txn(
    txn: &DatabaseTransaction,
    collection: &collections::Model,
    payment: collection_payments::Model,
    actor_id: Uuid,
    wallet_id: Uuid,
) -> Result<collection_payments::Model, CollectionError> {
    let participants = participants_of(collection);
    let plan = plan_allocation(
        &participants,
        UserId::from_uuid(actor_id),
        payment.amount,
        payment.creditor_income_id.is_some(),
        payment.debtor_expense_id.is_some(),
    )?;

    let wallet = WalletRepository::find_in_txn(txn, wallet_id).await?;
    if wallet.user_id != actor_id {
        return Err(CollectionError::NotWalletOwner);
    }
    if wallet.currency != collection.currency {
        return Err(CollectionError::CurrencyMismatch {
            wallet: wallet.currency,
            collection: collection.currency.clone(),
        });
    }

    let movement = CreateMovementInput {
        user_id: actor_id,
        wallet_id,
        amount: payment.amount,
        currency: collection.currency.clone(),
        description: movement_description(collection),
    };

    let movement_id = match plan.kind {
        MovementKind::Income => WalletRepository::create_income(txn, movement).await?,
        MovementKind::Expense => WalletRepository::create_expense(txn, movement).await?,
    };

    WalletRepository::adjust_balance(txn, wallet_id, plan.wallet_delta).await?;

    let mut active: collection_payments::ActiveModel = payment.into();
    match plan.side {
        Role::Creditor => active.creditor_income_id = Set(Some(movement_id)),
        Role::Debtor => active.debtor_expense_id = Set(Some(movement_id)),
    }

    let updated = active.update(txn).await.map_err(db_err)?;
    Ok(updated)
}

/// Description carried onto the realized movement record.
fn movement_description(collection: &collections::Model) -> Option<String> {
    Some(
        collection
            .description
            .clone()
            .unwrap_or_else(|| "Collection payment".to_string()),
    )
}
