//! User repository for account records and the friend directory.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{friends, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Email address (unique).
    pub email: String,
    /// Display name.
    pub full_name: String,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&input.email))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            full_name: Set(input.full_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = user.insert(&self.db).await?;
        Ok(result)
    }

    /// Finds a user by id.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<users::Model>, UserError> {
        let user = users::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(user)
    }

    /// Adds an entry to a user's friend directory.
    pub async fn add_friend(
        &self,
        user_id: Uuid,
        friend_user_id: Uuid,
        alias: String,
    ) -> Result<friends::Model, UserError> {
        let friend_exists = users::Entity::find_by_id(friend_user_id)
            .one(&self.db)
            .await?
            .is_some();

        if !friend_exists {
            return Err(UserError::NotFound(friend_user_id));
        }

        let entry = friends::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            friend_user_id: Set(friend_user_id),
            alias: Set(alias),
            created_at: Set(Utc::now().into()),
        };

        let result = entry.insert(&self.db).await?;
        Ok(result)
    }
}
