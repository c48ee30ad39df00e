//! Collection repository for the debt/credit lifecycle.
//!
//! Owns creation, approval/rejection, and cancellation. Every transition
//! re-reads the row under `SELECT ... FOR UPDATE` inside a database
//! transaction, so concurrent responders cannot both move the same
//! collection.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use utang_core::collection::{
    CollectionError, CollectionStatus, LifecycleService, Participants, Party, Role, ledger,
};
use utang_core::notify::Notifier;
use utang_shared::types::{CollectionId, PageRequest, PageResponse, UserId};

use crate::entities::{collection_payments, collections, sea_orm_active_enums};

/// Input for creating a collection.
#[derive(Debug, Clone)]
pub struct CreateCollectionInput {
    /// The creating user.
    pub actor_id: Uuid,
    /// The role the creator occupies.
    pub role: Role,
    /// The resolved counterparty for the opposite slot.
    pub counterparty: Party,
    /// Total obligation, fixed at creation.
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Filter options for listing collections.
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    /// Filter by status.
    pub status: Option<CollectionStatus>,
    /// Filter by the actor's role.
    pub role: Option<Role>,
}

/// Collection with its payments and the computed outstanding balance.
#[derive(Debug, Clone)]
pub struct CollectionWithPayments {
    /// Collection row.
    pub collection: collections::Model,
    /// Payments in recording order.
    pub payments: Vec<collection_payments::Model>,
    /// `amount - sum(payments)`.
    pub outstanding: Decimal,
}

/// Collection repository for lifecycle operations.
#[derive(Clone)]
pub struct CollectionRepository {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl CollectionRepository {
    /// Creates a new collection repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Creates a new collection.
    ///
    /// The counterparty slot decides the initial status: a registered
    /// counterparty must consent (`pending_approval`, notified), a manual
    /// one cannot (`active`, nobody to notify).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the participant
    /// pair is invalid, or the database operation fails.
    pub async fn create_collection(
        &self,
        input: CreateCollectionInput,
    ) -> Result<collections::Model, CollectionError> {
        LifecycleService::validate_amount(input.amount)?;

        let actor = UserId::from_uuid(input.actor_id);
        let participants =
            Participants::with_actor(input.role, actor, input.counterparty.clone());
        participants.validate(actor)?;

        let status = LifecycleService::initial_status(&input.counterparty);
        let now = Utc::now().into();

        let collection = collections::ActiveModel {
            id: Set(Uuid::new_v4()),
            creditor_id: Set(participants.creditor.registered_id().map(UserId::into_inner)),
            creditor_name: Set(manual_label(&participants.creditor)),
            debtor_id: Set(participants.debtor.registered_id().map(UserId::into_inner)),
            debtor_name: Set(manual_label(&participants.debtor)),
            amount: Set(input.amount),
            currency: Set(input.currency.clone()),
            description: Set(input.description),
            status: Set(core_status_to_db(status)),
            created_by: Set(input.actor_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = collection
            .insert(&self.db)
            .await
            .map_err(db_err)?;

        if status == CollectionStatus::PendingApproval
            && let Some(counterparty) = participants.other_registered(input.role)
        {
            let body = format!(
                "You have been recorded as the {} for {} {}",
                input.role.opposite(),
                created.amount,
                created.currency,
            );
            self.dispatch(
                counterparty,
                "New collection request",
                &body,
                &format!("/collections/{}", created.id),
            )
            .await;
        }

        Ok(created)
    }

    /// Applies the counterparty's accept/decline response.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found, is not awaiting
    /// approval, or the actor is not the pending registered counterparty.
    pub async fn respond(
        &self,
        collection_id: Uuid,
        actor_id: Uuid,
        accept: bool,
    ) -> Result<collections::Model, CollectionError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let collection = find_locked(&txn, collection_id).await?;
        let participants = participants_of(&collection);

        // The responder is the registered party that did not create the record.
        let counterparty = participants
            .role_of(UserId::from_uuid(collection.created_by))
            .and_then(|creator_role| participants.other_registered(creator_role));
        if counterparty.map(UserId::into_inner) != Some(actor_id) {
            return Err(CollectionError::NotCounterparty);
        }

        let current = db_status_to_core(&collection.status);
        let new_status = LifecycleService::respond(current, accept)?;

        let creator = collection.created_by;
        let mut active: collections::ActiveModel = collection.into();
        active.status = Set(core_status_to_db(new_status));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        if accept {
            self.dispatch(
                UserId::from_uuid(creator),
                "Collection accepted",
                &format!(
                    "Your collection for {} {} is now active",
                    updated.amount, updated.currency
                ),
                &format!("/collections/{}", updated.id),
            )
            .await;
        }

        Ok(updated)
    }

    /// Cancels a collection.
    ///
    /// While `pending_approval` only the creator may withdraw it; once
    /// active either registered participant may cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found, the actor is not a
    /// registered participant, or the status forbids cancellation.
    pub async fn cancel(
        &self,
        collection_id: Uuid,
        actor_id: Uuid,
    ) -> Result<collections::Model, CollectionError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let collection = find_locked(&txn, collection_id).await?;
        let participants = participants_of(&collection);

        let actor = UserId::from_uuid(actor_id);
        let role = participants
            .role_of(actor)
            .ok_or(CollectionError::NotParticipant)?;

        let current = db_status_to_core(&collection.status);
        let is_creator = collection.created_by == actor_id;
        let new_status = LifecycleService::cancel(current, is_creator)?;

        let mut active: collections::ActiveModel = collection.into();
        active.status = Set(core_status_to_db(new_status));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        if let Some(other) = participants.other_registered(role) {
            self.dispatch(
                other,
                "Collection cancelled",
                &format!(
                    "The collection for {} {} was cancelled",
                    updated.amount, updated.currency
                ),
                &format!("/collections/{}", updated.id),
            )
            .await;
        }

        Ok(updated)
    }

    /// Gets a collection with its payments, for a participant.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or the actor is not
    /// a registered participant.
    pub async fn get_for_participant(
        &self,
        collection_id: Uuid,
        actor_id: Uuid,
    ) -> Result<CollectionWithPayments, CollectionError> {
        let collection = collections::Entity::find_by_id(collection_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                CollectionError::CollectionNotFound(CollectionId::from_uuid(collection_id))
            })?;

        let participants = participants_of(&collection);
        participants
            .role_of(UserId::from_uuid(actor_id))
            .ok_or(CollectionError::NotParticipant)?;

        let payments = collection_payments::Entity::find()
            .filter(collection_payments::Column::CollectionId.eq(collection_id))
            .order_by_asc(collection_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let paid_total: Decimal = payments.iter().map(|p| p.amount).sum();
        let outstanding = ledger::outstanding(collection.amount, paid_total);

        Ok(CollectionWithPayments {
            collection,
            payments,
            outstanding,
        })
    }

    /// Lists the actor's collections (either side), newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_actor(
        &self,
        actor_id: Uuid,
        filter: CollectionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<collections::Model>, CollectionError> {
        let side_condition = match filter.role {
            Some(Role::Creditor) => {
                Condition::all().add(collections::Column::CreditorId.eq(actor_id))
            }
            Some(Role::Debtor) => {
                Condition::all().add(collections::Column::DebtorId.eq(actor_id))
            }
            None => Condition::any()
                .add(collections::Column::CreditorId.eq(actor_id))
                .add(collections::Column::DebtorId.eq(actor_id)),
        };

        let mut query = collections::Entity::find().filter(side_condition);

        if let Some(status) = filter.status {
            query = query.filter(collections::Column::Status.eq(core_status_to_db(status)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let items = query
            .order_by_desc(collections::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    /// Dispatches a notification, logging failures without propagating them.
    async fn dispatch(&self, recipient: UserId, title: &str, body: &str, link: &str) {
        if let Err(e) = self.notifier.notify(recipient, title, body, link).await {
            warn!(error = %e, %recipient, "notification dispatch failed");
        }
    }
}

/// Fetches a collection under a row lock inside an open transaction.
pub(crate) async fn find_locked(
    txn: &DatabaseTransaction,
    collection_id: Uuid,
) -> Result<collections::Model, CollectionError> {
    collections::Entity::find_by_id(collection_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| CollectionError::CollectionNotFound(CollectionId::from_uuid(collection_id)))
}

/// Builds the participant pair from a collection row.
pub(crate) fn participants_of(collection: &collections::Model) -> Participants {
    Participants {
        creditor: party_from_slot(collection.creditor_id, collection.creditor_name.as_deref()),
        debtor: party_from_slot(collection.debtor_id, collection.debtor_name.as_deref()),
    }
}

/// Builds one participant slot from its two columns.
///
/// The table CHECK constraint guarantees exactly one of the two is set.
fn party_from_slot(id: Option<Uuid>, name: Option<&str>) -> Party {
    match id {
        Some(id) => Party::Registered(UserId::from_uuid(id)),
        None => Party::Manual(name.unwrap_or_default().to_string()),
    }
}

/// Returns the manual label for a slot, if any.
fn manual_label(party: &Party) -> Option<String> {
    match party {
        Party::Registered(_) => None,
        Party::Manual(label) => Some(label.trim().to_string()),
    }
}

/// Converts database CollectionStatus to core CollectionStatus.
pub(crate) fn db_status_to_core(status: &sea_orm_active_enums::CollectionStatus) -> CollectionStatus {
    match status {
        sea_orm_active_enums::CollectionStatus::PendingApproval => CollectionStatus::PendingApproval,
        sea_orm_active_enums::CollectionStatus::Active => CollectionStatus::Active,
        sea_orm_active_enums::CollectionStatus::PartiallyPaid => CollectionStatus::PartiallyPaid,
        sea_orm_active_enums::CollectionStatus::Paid => CollectionStatus::Paid,
        sea_orm_active_enums::CollectionStatus::Rejected => CollectionStatus::Rejected,
        sea_orm_active_enums::CollectionStatus::Cancelled => CollectionStatus::Cancelled,
    }
}

/// Converts core CollectionStatus to database CollectionStatus.
pub(crate) fn core_status_to_db(status: CollectionStatus) -> sea_orm_active_enums::CollectionStatus {
    match status {
        CollectionStatus::PendingApproval => sea_orm_active_enums::CollectionStatus::PendingApproval,
        CollectionStatus::Active => sea_orm_active_enums::CollectionStatus::Active,
        CollectionStatus::PartiallyPaid => sea_orm_active_enums::CollectionStatus::PartiallyPaid,
        CollectionStatus::Paid => sea_orm_active_enums::CollectionStatus::Paid,
        CollectionStatus::Rejected => sea_orm_active_enums::CollectionStatus::Rejected,
        CollectionStatus::Cancelled => sea_orm_active_enums::CollectionStatus::Cancelled,
    }
}

/// Maps a database error into the domain error type.
pub(crate) fn db_err(e: DbErr) -> CollectionError {
    CollectionError::Database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_status() -> impl Strategy<Value = CollectionStatus> {
        prop_oneof![
            Just(CollectionStatus::PendingApproval),
            Just(CollectionStatus::Active),
            Just(CollectionStatus::PartiallyPaid),
            Just(CollectionStatus::Paid),
            Just(CollectionStatus::Rejected),
            Just(CollectionStatus::Cancelled),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Core and database status enums map one-to-one.
        #[test]
        fn prop_status_conversion_roundtrip(status in arb_status()) {
            prop_assert_eq!(db_status_to_core(&core_status_to_db(status)), status);
        }
    }

    #[test]
    fn test_party_from_slot_prefers_registered_id() {
        let id = Uuid::new_v4();
        let party = party_from_slot(Some(id), None);
        assert_eq!(party, Party::Registered(UserId::from_uuid(id)));
    }

    #[test]
    fn test_party_from_slot_falls_back_to_label() {
        let party = party_from_slot(None, Some("Juan"));
        assert_eq!(party, Party::Manual("Juan".to_string()));
    }

    #[test]
    fn test_manual_label_trims() {
        assert_eq!(
            manual_label(&Party::Manual("  Juan ".to_string())),
            Some("Juan".to_string())
        );
        assert_eq!(
            manual_label(&Party::Registered(UserId::new())),
            None
        );
    }
}
