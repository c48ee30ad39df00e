//! Integration tests for the allocation repository.
//!
//! Requires a migrated database via DATABASE_URL; tests skip themselves
//! otherwise.

mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use utang_core::collection::{CollectionError, Party, Role};
use utang_db::entities::{expenses, incomes, wallets};
use utang_db::repositories::{
    AllocationRepository, CollectionRepository, CreateCollectionInput, PaymentRepository,
    RecordPaymentInput,
};
use utang_shared::types::{Currency, UserId};

/// Active two-user collection of 100 PHP with one unallocated payment of 60.
async fn collection_with_payment(
    db: &DatabaseConnection,
    creditor: Uuid,
    debtor: Uuid,
) -> (Uuid, Uuid) {
    let collections = CollectionRepository::new(db.clone(), common::notifier());
    let collection = collections
        .create_collection(CreateCollectionInput {
            actor_id: creditor,
            role: Role::Creditor,
            counterparty: Party::Registered(UserId::from_uuid(debtor)),
            amount: dec!(100),
            currency: "PHP".to_string(),
            description: Some("Groceries".to_string()),
        })
        .await
        .unwrap();
    collections.respond(collection.id, debtor, true).await.unwrap();

    let payments = PaymentRepository::new(db.clone(), common::notifier());
    let payment = payments
        .record_payment(RecordPaymentInput {
            collection_id: collection.id,
            actor_id: creditor,
            amount: dec!(60),
            notes: None,
            wallet_id: None,
        })
        .await
        .unwrap();

    (collection.id, payment.id)
}

#[tokio::test]
async fn test_allocate_creditor_side_creates_income() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let wallet_id = common::create_wallet(&db, creditor).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    let payment = allocations
        .allocate(payment_id, creditor, wallet_id)
        .await
        .unwrap();

    let income_id = payment.creditor_income_id.expect("income back-reference");
    assert_eq!(payment.debtor_expense_id, None);

    let income = incomes::Entity::find_by_id(income_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(income.amount, dec!(60));
    assert_eq!(income.user_id, creditor);

    let wallet = wallets::Entity::find_by_id(wallet_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(60));
}

#[tokio::test]
async fn test_allocate_debtor_side_creates_expense() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let wallet_id = common::create_wallet(&db, debtor).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    let payment = allocations
        .allocate(payment_id, debtor, wallet_id)
        .await
        .unwrap();

    let expense_id = payment.debtor_expense_id.expect("expense back-reference");
    assert_eq!(payment.creditor_income_id, None);

    let expense = expenses::Entity::find_by_id(expense_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expense.amount, dec!(60));
    assert_eq!(expense.user_id, debtor);

    let wallet = wallets::Entity::find_by_id(wallet_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(-60));
}

#[tokio::test]
async fn test_sides_allocate_independently() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let creditor_wallet = common::create_wallet(&db, creditor).await;
    let debtor_wallet = common::create_wallet(&db, debtor).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());

    let after_creditor = allocations
        .allocate(payment_id, creditor, creditor_wallet)
        .await
        .unwrap();
    assert!(after_creditor.creditor_income_id.is_some());
    assert_eq!(after_creditor.debtor_expense_id, None);

    let after_debtor = allocations
        .allocate(payment_id, debtor, debtor_wallet)
        .await
        .unwrap();
    assert!(after_debtor.creditor_income_id.is_some());
    assert!(after_debtor.debtor_expense_id.is_some());
}

#[tokio::test]
async fn test_second_allocation_same_side_is_rejected() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let wallet_id = common::create_wallet(&db, creditor).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    allocations
        .allocate(payment_id, creditor, wallet_id)
        .await
        .unwrap();

    let second = allocations.allocate(payment_id, creditor, wallet_id).await;
    assert!(matches!(
        second,
        Err(CollectionError::AlreadyAllocated {
            side: Role::Creditor
        })
    ));

    // No double movement, no double balance adjustment.
    let income_count = incomes::Entity::find()
        .filter(incomes::Column::UserId.eq(creditor))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(income_count, 1);

    let wallet = wallets::Entity::find_by_id(wallet_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(60));
}

#[tokio::test]
async fn test_allocate_by_stranger_is_rejected() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let stranger = common::create_user(&db, "stranger").await;
    let stranger_wallet = common::create_wallet(&db, stranger).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    let result = allocations.allocate(payment_id, stranger, stranger_wallet).await;
    assert!(matches!(result, Err(CollectionError::NotParticipant)));
}

#[tokio::test]
async fn test_allocate_against_foreign_wallet_is_rejected() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let debtor_wallet = common::create_wallet(&db, debtor).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    let result = allocations.allocate(payment_id, creditor, debtor_wallet).await;
    assert!(matches!(result, Err(CollectionError::NotWalletOwner)));
}

#[tokio::test]
async fn test_allocate_currency_mismatch_is_rejected() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let debtor = common::create_user(&db, "debtor").await;
    let usd_wallet = common::create_wallet_with_currency(&db, creditor, Currency::Usd).await;
    let (_, payment_id) = collection_with_payment(&db, creditor, debtor).await;

    let allocations = AllocationRepository::new(db.clone());
    let result = allocations.allocate(payment_id, creditor, usd_wallet).await;
    assert!(matches!(
        result,
        Err(CollectionError::CurrencyMismatch { .. })
    ));

    // Nothing moved.
    let wallet = wallets::Entity::find_by_id(usd_wallet)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, dec!(0));
}

#[tokio::test]
async fn test_manual_party_collection_allocates_one_side_only() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let creditor = common::create_user(&db, "creditor").await;
    let outsider = common::create_user(&db, "outsider").await;
    let creditor_wallet = common::create_wallet(&db, creditor).await;
    let outsider_wallet = common::create_wallet(&db, outsider).await;

    let collections = CollectionRepository::new(db.clone(), common::notifier());
    let collection = collections
        .create_collection(CreateCollectionInput {
            actor_id: creditor,
            role: Role::Creditor,
            counterparty: Party::Manual("Juan".to_string()),
            amount: dec!(100),
            currency: "PHP".to_string(),
            description: None,
        })
        .await
        .unwrap();

    // Born active: the manual debtor never approves anything.
    let payments = PaymentRepository::new(db.clone(), common::notifier());
    let payment = payments
        .record_payment(RecordPaymentInput {
            collection_id: collection.id,
            actor_id: creditor,
            amount: dec!(60),
            notes: None,
            wallet_id: Some(creditor_wallet),
        })
        .await
        .unwrap();
    assert!(payment.creditor_income_id.is_some());
    assert_eq!(payment.debtor_expense_id, None);

    // Nobody can ever act for the manual side.
    let allocations = AllocationRepository::new(db.clone());
    let result = allocations
        .allocate(payment.id, outsider, outsider_wallet)
        .await;
    assert!(matches!(result, Err(CollectionError::NotParticipant)));
}

/// The end-to-end two-sided settlement flow: create, approve, record with
/// inline creditor allocation, then the debtor allocates independently.
#[tokio::test]
async fn test_two_sided_settlement_flow() {
    let Some(db) = common::try_connect().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let u1 = common::create_user(&db, "u1").await;
    let u2 = common::create_user(&db, "u2").await;
    let w1 = common::create_wallet(&db, u1).await;
    let w2 = common::create_wallet(&db, u2).await;

    let collections = CollectionRepository::new(db.clone(), common::notifier());
    let collection = collections
        .create_collection(CreateCollectionInput {
            actor_id: u1,
            role: Role::Creditor,
            counterparty: Party::Registered(UserId::from_uuid(u2)),
            amount: dec!(100),
            currency: "PHP".to_string(),
            description: None,
        })
        .await
        .unwrap();
    collections.respond(collection.id, u2, true).await.unwrap();

    let payments = PaymentRepository::new(db.clone(), common::notifier());
    let payment = payments
        .record_payment(RecordPaymentInput {
            collection_id: collection.id,
            actor_id: u1,
            amount: dec!(60),
            notes: None,
            wallet_id: Some(w1),
        })
        .await
        .unwrap();
    assert!(payment.creditor_income_id.is_some());

    let detail = collections
        .get_for_participant(collection.id, u2)
        .await
        .unwrap();
    assert_eq!(detail.outstanding, dec!(40));

    let allocations = AllocationRepository::new(db.clone());
    let payment = allocations.allocate(payment.id, u2, w2).await.unwrap();
    assert!(payment.creditor_income_id.is_some());
    assert!(payment.debtor_expense_id.is_some());

    let w1_row = wallets::Entity::find_by_id(w1).one(&db).await.unwrap().unwrap();
    let w2_row = wallets::Entity::find_by_id(w2).one(&db).await.unwrap().unwrap();
    assert_eq!(w1_row.balance, dec!(60));
    assert_eq!(w2_row.balance, dec!(-60));
}
