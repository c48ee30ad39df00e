//! Wallet ledger repository.
//!
//! Owns wallet balances and the realized Income/Expense records. The
//! balance is only ever mutated through `adjust_balance`, a single
//! signed-delta UPDATE, so concurrent wallet activity (expenses, incomes,
//! transfers) can never lose updates.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use utang_core::collection::CollectionError;
use utang_shared::types::{Currency, WalletId};

use crate::entities::{expenses, incomes, wallets};

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<WalletError> for CollectionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotFound(id) => Self::WalletNotFound(WalletId::from_uuid(id)),
            WalletError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a wallet.
#[derive(Debug, Clone)]
pub struct CreateWalletInput {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Wallet currency.
    pub currency: Currency,
}

/// Input for a realized Income/Expense record.
#[derive(Debug, Clone)]
pub struct CreateMovementInput {
    /// The user whose money moved.
    pub user_id: Uuid,
    /// The wallet the money moved against.
    pub wallet_id: Uuid,
    /// Movement amount (positive).
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Wallet repository for balance and movement operations.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new wallet with a zero balance.
    pub async fn create_wallet(
        &self,
        input: CreateWalletInput,
    ) -> Result<wallets::Model, WalletError> {
        let now = Utc::now().into();

        let wallet = wallets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            currency: Set(input.currency.to_string()),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = wallet.insert(&self.db).await?;
        Ok(result)
    }

    /// Gets a wallet by id.
    pub async fn get(&self, wallet_id: Uuid) -> Result<wallets::Model, WalletError> {
        wallets::Entity::find_by_id(wallet_id)
            .one(&self.db)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))
    }

    /// Lists a user's wallets.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<wallets::Model>, WalletError> {
        let wallets = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .order_by_asc(wallets::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(wallets)
    }

    /// Fetches a wallet inside an open transaction.
    pub async fn find_in_txn(
        txn: &DatabaseTransaction,
        wallet_id: Uuid,
    ) -> Result<wallets::Model, WalletError> {
        wallets::Entity::find_by_id(wallet_id)
            .one(txn)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))
    }

    /// Applies a signed delta to a wallet balance.
    ///
    /// Executes a single `balance = balance + delta` UPDATE so the
    /// read-modify-write happens inside the database, serialized against
    /// every other writer of the row.
    pub async fn adjust_balance(
        txn: &DatabaseTransaction,
        wallet_id: Uuid,
        delta: Decimal,
    ) -> Result<(), WalletError> {
        // updated_at is maintained by the row trigger
        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::Balance,
                Expr::col(wallets::Column::Balance).add(delta),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(WalletError::NotFound(wallet_id));
        }

        Ok(())
    }

    /// Creates a realized Income record inside an open transaction.
    ///
    /// Returns the new record's id for the payment back-reference.
    pub async fn create_income(
        txn: &DatabaseTransaction,
        input: CreateMovementInput,
    ) -> Result<Uuid, WalletError> {
        let now = Utc::now().into();
        let income_id = Uuid::new_v4();

        let income = incomes::ActiveModel {
            id: Set(income_id),
            user_id: Set(input.user_id),
            wallet_id: Set(input.wallet_id),
            amount: Set(input.amount),
            currency: Set(input.currency),
            occurred_at: Set(now),
            description: Set(input.description),
            created_at: Set(now),
        };

        income.insert(txn).await?;
        Ok(income_id)
    }

    /// Creates a realized Expense record inside an open transaction.
    ///
    /// Returns the new record's id for the payment back-reference.
    pub async fn create_expense(
        txn: &DatabaseTransaction,
        input: CreateMovementInput,
    ) -> Result<Uuid, WalletError> {
        let now = Utc::now().into();
        let expense_id = Uuid::new_v4();

        let expense = expenses::ActiveModel {
            id: Set(expense_id),
            user_id: Set(input.user_id),
            wallet_id: Set(input.wallet_id),
            amount: Set(input.amount),
            currency: Set(input.currency),
            occurred_at: Set(now),
            description: Set(input.description),
            created_at: Set(now),
        };

        expense.insert(txn).await?;
        Ok(expense_id)
    }
}
