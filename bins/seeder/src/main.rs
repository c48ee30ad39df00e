//! Database seeder for Utang development and testing.
//!
//! Seeds two test users with a mutual friendship and a wallet each, for
//! exercising the collection flow locally.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use utang_db::entities::{friends, users, wallets};

/// First test user ID (consistent for all seeds)
const TEST_USER_ANA: &str = "00000000-0000-0000-0000-000000000001";
/// Second test user ID (consistent for all seeds)
const TEST_USER_BEN: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = utang_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test users...");
    seed_user(&db, ana_id(), "ana@example.com", "Ana Reyes").await;
    seed_user(&db, ben_id(), "ben@example.com", "Ben Santos").await;

    println!("Seeding friendship...");
    seed_friendship(&db, ana_id(), ben_id(), "Ben").await;
    seed_friendship(&db, ben_id(), ana_id(), "Ana").await;

    println!("Seeding wallets...");
    seed_wallet(&db, ana_id(), "Cash").await;
    seed_wallet(&db, ben_id(), "Cash").await;

    println!("Seeding complete!");
}

fn ana_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ANA).unwrap()
}

fn ben_id() -> Uuid {
    Uuid::parse_str(TEST_USER_BEN).unwrap()
}

async fn seed_user(db: &DatabaseConnection, id: Uuid, email: &str, full_name: &str) {
    if users::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query failed")
        .is_some()
    {
        println!("  user {email} already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("failed to seed user");
}

async fn seed_friendship(db: &DatabaseConnection, user_id: Uuid, friend_user_id: Uuid, alias: &str) {
    use sea_orm::{ColumnTrait, QueryFilter};

    let existing = friends::Entity::find()
        .filter(friends::Column::UserId.eq(user_id))
        .filter(friends::Column::FriendUserId.eq(friend_user_id))
        .one(db)
        .await
        .expect("query failed");

    if existing.is_some() {
        println!("  friendship {alias} already exists, skipping");
        return;
    }

    friends::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        friend_user_id: Set(friend_user_id),
        alias: Set(alias.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("failed to seed friendship");
}

async fn seed_wallet(db: &DatabaseConnection, user_id: Uuid, name: &str) {
    use sea_orm::{ColumnTrait, QueryFilter};

    let existing = wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .one(db)
        .await
        .expect("query failed");

    if existing.is_some() {
        println!("  wallet for {user_id} already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    wallets::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        currency: Set("PHP".to_string()),
        balance: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("failed to seed wallet");
}
