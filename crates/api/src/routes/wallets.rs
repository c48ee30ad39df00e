//! Wallet management routes.
//!
//! Minimal surface over the Wallet Ledger collaborator: create a wallet
//! and list the actor's wallets with balances. Everything else about
//! wallets lives outside this service.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::routes::app_error_response;
use crate::{AppState, extractors::ActorId};
use utang_db::entities::wallets;
use utang_db::repositories::{CreateWalletInput, WalletError, WalletRepository};
use utang_shared::AppError;
use utang_shared::types::Currency;

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", post(create_wallet))
        .route("/wallets", get(list_wallets))
}

/// Request body for creating a wallet.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    /// Display name.
    pub name: String,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Response for a wallet.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Currency code.
    pub currency: String,
    /// Current balance.
    pub balance: String,
    /// Created at timestamp.
    pub created_at: String,
}

/// POST `/wallets` - Create a wallet for the actor.
async fn create_wallet(
    State(state): State<AppState>,
    actor: ActorId,
    Json(request): Json<CreateWalletRequest>,
) -> impl IntoResponse {
    let Ok(currency) = Currency::from_str(&request.currency) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_currency",
                "message": format!("Unknown currency: {}", request.currency)
            })),
        )
            .into_response();
    };

    if request.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Wallet name cannot be blank"
            })),
        )
            .into_response();
    }

    let repo = WalletRepository::new((*state.db).clone());
    match repo
        .create_wallet(CreateWalletInput {
            user_id: actor.user_id(),
            name: request.name.trim().to_string(),
            currency,
        })
        .await
    {
        Ok(wallet) => (StatusCode::CREATED, Json(to_response(&wallet))).into_response(),
        Err(e) => wallet_error_response(&e),
    }
}

/// GET `/wallets` - List the actor's wallets.
async fn list_wallets(State(state): State<AppState>, actor: ActorId) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());
    match repo.list_for_user(actor.user_id()).await {
        Ok(wallets) => {
            let items: Vec<WalletResponse> = wallets.iter().map(to_response).collect();
            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => wallet_error_response(&e),
    }
}

fn to_response(wallet: &wallets::Model) -> WalletResponse {
    WalletResponse {
        id: wallet.id,
        user_id: wallet.user_id,
        name: wallet.name.clone(),
        currency: wallet.currency.clone(),
        balance: wallet.balance.to_string(),
        created_at: wallet.created_at.to_rfc3339(),
    }
}

fn wallet_error_response(e: &WalletError) -> axum::response::Response {
    let app_error = match e {
        WalletError::NotFound(id) => AppError::NotFound(format!("Wallet {id}")),
        WalletError::Database(err) => AppError::Database(err.to_string()),
    };
    app_error_response(&app_error)
}
