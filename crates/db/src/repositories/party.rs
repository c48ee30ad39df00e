//! Party resolver backed by the users table and the friend directory.
//!
//! A counterparty reference is free text: a user id, a friend alias, or —
//! when neither resolves — a manual label for an unregistered party.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use utang_core::collection::{CollectionError, Party};
use utang_shared::types::UserId;

use crate::entities::{friends, users};

/// Resolves counterparty references for collection creation.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves a counterparty reference for `actor_id`.
    ///
    /// Resolution order:
    /// 1. a well-formed UUID naming an active registered user;
    /// 2. an alias from the actor's friend directory;
    /// 3. otherwise a manual label for an unregistered party.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is blank, names the actor
    /// themselves, or is a UUID with no matching active user.
    pub async fn resolve_counterparty(
        &self,
        actor_id: Uuid,
        reference: &str,
    ) -> Result<Party, CollectionError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CollectionError::InvalidCounterparty(
                "counterparty reference cannot be blank".to_string(),
            ));
        }

        if let Ok(user_id) = Uuid::parse_str(reference) {
            return self.resolve_registered(actor_id, user_id).await;
        }

        let friend = friends::Entity::find()
            .filter(friends::Column::UserId.eq(actor_id))
            .filter(friends::Column::Alias.eq(reference))
            .one(&self.db)
            .await
            .map_err(|e| CollectionError::Database(e.to_string()))?;

        match friend {
            Some(friend) => self.resolve_registered(actor_id, friend.friend_user_id).await,
            None => Ok(Party::Manual(reference.to_string())),
        }
    }

    /// Checks that a registered counterparty exists, is active, and is not
    /// the actor.
    async fn resolve_registered(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<Party, CollectionError> {
        if user_id == actor_id {
            return Err(CollectionError::InvalidCounterparty(
                "counterparty cannot be yourself".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| CollectionError::Database(e.to_string()))?;

        match user {
            Some(user) if user.is_active => Ok(Party::Registered(UserId::from_uuid(user.id))),
            _ => Err(CollectionError::CounterpartyNotFound(UserId::from_uuid(
                user_id,
            ))),
        }
    }
}
