//! Shared helpers for repository integration tests.
//!
//! These tests run against a live, migrated PostgreSQL database named by
//! `DATABASE_URL` (or `UTANG__DATABASE__URL`) and skip themselves when
//! neither is set. Run `cargo run --bin migrator up` first.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use utang_core::notify::{Notifier, NotifyError};
use utang_db::repositories::{CreateUserInput, CreateWalletInput, UserRepository, WalletRepository};
use utang_shared::types::{Currency, UserId};

/// Returns the configured database URL, if any.
pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .ok()
        .or_else(|| env::var("UTANG__DATABASE__URL").ok())
}

/// Connects to the test database, or `None` to skip the test.
pub async fn try_connect() -> Option<DatabaseConnection> {
    let url = database_url()?;
    Some(
        Database::connect(&url)
            .await
            .expect("failed to connect to test database"),
    )
}

/// Notifier that drops every notification.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(
        &self,
        _recipient: UserId,
        _title: &str,
        _body: &str,
        _link: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Shared notifier instance for repository construction.
pub fn notifier() -> Arc<dyn Notifier> {
    Arc::new(NullNotifier)
}

/// Creates a test user with a unique email.
pub async fn create_user(db: &DatabaseConnection, name: &str) -> Uuid {
    let repo = UserRepository::new(db.clone());
    let user = repo
        .create_user(CreateUserInput {
            email: format!("{name}-{}@example.com", Uuid::new_v4()),
            full_name: name.to_string(),
        })
        .await
        .expect("failed to create test user");
    user.id
}

/// Creates a PHP wallet for a user.
pub async fn create_wallet(db: &DatabaseConnection, user_id: Uuid) -> Uuid {
    create_wallet_with_currency(db, user_id, Currency::Php).await
}

/// Creates a wallet in the given currency.
pub async fn create_wallet_with_currency(
    db: &DatabaseConnection,
    user_id: Uuid,
    currency: Currency,
) -> Uuid {
    let repo = WalletRepository::new(db.clone());
    let wallet = repo
        .create_wallet(CreateWalletInput {
            user_id,
            name: format!("Wallet {}", Uuid::new_v4()),
            currency,
        })
        .await
        .expect("failed to create test wallet");
    wallet.id
}

