//! Collection lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::routes::{collection_error_response, payments::PaymentResponse};
use crate::{AppState, extractors::ActorId};
use utang_core::collection::{CollectionStatus, Role};
use utang_db::entities::{collections, sea_orm_active_enums};
use utang_db::repositories::{
    CollectionFilter, CollectionRepository, CreateCollectionInput, PartyRepository,
    PaymentRepository, RecordPaymentInput,
};
use utang_shared::types::PageRequest;

/// Creates the collection routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", post(create_collection))
        .route("/collections", get(list_collections))
        .route("/collections/{collection_id}", get(get_collection))
        .route("/collections/{collection_id}/respond", post(respond_to_collection))
        .route("/collections/{collection_id}/cancel", post(cancel_collection))
        .route("/collections/{collection_id}/payments", post(record_payment))
        .route("/collections/{collection_id}/settle", post(settle_collection))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a collection.
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    /// The actor's role: "creditor" or "debtor".
    pub role: String,
    /// Counterparty reference: a user id, a friend alias, or a manual label.
    pub counterparty: String,
    /// Total obligation (positive decimal).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for responding to a pending collection.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// true accepts, false declines.
    pub accept: bool,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount (positive decimal).
    pub amount: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When set, allocates the actor's side against this wallet inline.
    pub wallet_id: Option<Uuid>,
}

/// Request body for settling the remaining balance.
#[derive(Debug, Default, Deserialize)]
pub struct SettleRequest {
    /// When set, allocates the actor's side against this wallet inline.
    pub wallet_id: Option<Uuid>,
}

/// Query parameters for listing collections.
#[derive(Debug, Deserialize)]
pub struct ListCollectionsQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by the actor's role.
    pub role: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Response for a collection.
#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    /// Collection ID.
    pub id: Uuid,
    /// Registered creditor, if any.
    pub creditor_id: Option<Uuid>,
    /// Manual creditor label, if any.
    pub creditor_name: Option<String>,
    /// Registered debtor, if any.
    pub debtor_id: Option<Uuid>,
    /// Manual debtor label, if any.
    pub debtor_name: Option<String>,
    /// Total obligation.
    pub amount: String,
    /// Currency code.
    pub currency: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: &'static str,
    /// Creating user ID.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// Response for a collection with its payments.
#[derive(Debug, Serialize)]
pub struct CollectionDetailResponse {
    /// The collection.
    #[serde(flatten)]
    pub collection: CollectionResponse,
    /// Outstanding balance.
    pub outstanding: String,
    /// Payments in recording order.
    pub payments: Vec<PaymentResponse>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/collections` - Create a collection.
async fn create_collection(
    State(state): State<AppState>,
    actor: ActorId,
    Json(request): Json<CreateCollectionRequest>,
) -> impl IntoResponse {
    let Some(role) = Role::parse(&request.role) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_role",
                "message": format!("Role must be 'creditor' or 'debtor', got '{}'", request.role)
            })),
        )
            .into_response();
    };

    if utang_shared::types::Currency::from_str(&request.currency).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_currency",
                "message": format!("Unknown currency: {}", request.currency)
            })),
        )
            .into_response();
    }

    let amount = match parse_amount(&request.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };

    let parties = PartyRepository::new((*state.db).clone());
    let counterparty = match parties
        .resolve_counterparty(actor.user_id(), &request.counterparty)
        .await
    {
        Ok(party) => party,
        Err(e) => return collection_error_response(&e),
    };

    let repo = CollectionRepository::new((*state.db).clone(), state.notifier.clone());
    match repo
        .create_collection(CreateCollectionInput {
            actor_id: actor.user_id(),
            role,
            counterparty,
            amount,
            currency: request.currency.to_uppercase(),
            description: request.description,
        })
        .await
    {
        Ok(collection) => {
            (StatusCode::CREATED, Json(to_response(&collection))).into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}

/// GET `/collections` - List the actor's collections.
async fn list_collections(
    State(state): State<AppState>,
    actor: ActorId,
    Query(query): Query<ListCollectionsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match CollectionStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Unknown status: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let role = match query.role.as_deref() {
        Some(r) => match Role::parse(r) {
            Some(role) => Some(role),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_role",
                        "message": format!("Unknown role: {r}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(pp) = query.per_page {
        page.per_page = pp.min(100);
    }

    let repo = CollectionRepository::new((*state.db).clone(), state.notifier.clone());
    match repo
        .list_for_actor(actor.user_id(), CollectionFilter { status, role }, page)
        .await
    {
        Ok(result) => {
            let items: Vec<CollectionResponse> = result.data.iter().map(to_response).collect();
            (
                StatusCode::OK,
                Json(json!({ "data": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}

/// GET `/collections/{collection_id}` - Collection detail with payments.
async fn get_collection(
    State(state): State<AppState>,
    actor: ActorId,
    Path(collection_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CollectionRepository::new((*state.db).clone(), state.notifier.clone());
    match repo.get_for_participant(collection_id, actor.user_id()).await {
        Ok(detail) => {
            let response = CollectionDetailResponse {
                collection: to_response(&detail.collection),
                outstanding: detail.outstanding.to_string(),
                payments: detail.payments.iter().map(PaymentResponse::from_model).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}

/// POST `/collections/{collection_id}/respond` - Accept or decline a
/// pending collection.
async fn respond_to_collection(
    State(state): State<AppState>,
    actor: ActorId,
    Path(collection_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> impl IntoResponse {
    let repo = CollectionRepository::new((*state.db).clone(), state.notifier.clone());
    match repo
        .respond(collection_id, actor.user_id(), request.accept)
        .await
    {
        Ok(collection) => (StatusCode::OK, Json(to_response(&collection))).into_response(),
        Err(e) => collection_error_response(&e),
    }
}

/// POST `/collections/{collection_id}/cancel` - Cancel a collection.
async fn cancel_collection(
    State(state): State<AppState>,
    actor: ActorId,
    Path(collection_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CollectionRepository::new((*state.db).clone(), state.notifier.clone());
    match repo.cancel(collection_id, actor.user_id()).await {
        Ok(collection) => (StatusCode::OK, Json(to_response(&collection))).into_response(),
        Err(e) => collection_error_response(&e),
    }
}

/// POST `/collections/{collection_id}/payments` - Record a partial payment.
async fn record_payment(
    State(state): State<AppState>,
    actor: ActorId,
    Path(collection_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let amount = match parse_amount(&request.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };

    let repo = PaymentRepository::new((*state.db).clone(), state.notifier.clone());
    match repo
        .record_payment(RecordPaymentInput {
            collection_id,
            actor_id: actor.user_id(),
            amount,
            notes: request.notes,
            wallet_id: request.wallet_id,
        })
        .await
    {
        Ok(payment) => {
            (StatusCode::CREATED, Json(PaymentResponse::from_model(&payment))).into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}

/// POST `/collections/{collection_id}/settle` - Settle the remaining
/// balance in one payment.
async fn settle_collection(
    State(state): State<AppState>,
    actor: ActorId,
    Path(collection_id): Path<Uuid>,
    request: Option<Json<SettleRequest>>,
) -> impl IntoResponse {
    let wallet_id = request.map(|Json(r)| r.wallet_id).unwrap_or_default();

    let repo = PaymentRepository::new((*state.db).clone(), state.notifier.clone());
    match repo
        .mark_fully_paid(collection_id, actor.user_id(), wallet_id)
        .await
    {
        Ok(payment) => {
            (StatusCode::CREATED, Json(PaymentResponse::from_model(&payment))).into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn to_response(collection: &collections::Model) -> CollectionResponse {
    CollectionResponse {
        id: collection.id,
        creditor_id: collection.creditor_id,
        creditor_name: collection.creditor_name.clone(),
        debtor_id: collection.debtor_id,
        debtor_name: collection.debtor_name.clone(),
        amount: collection.amount.to_string(),
        currency: collection.currency.clone(),
        description: collection.description.clone(),
        status: status_string(&collection.status),
        created_by: collection.created_by,
        created_at: collection.created_at.to_rfc3339(),
        updated_at: collection.updated_at.to_rfc3339(),
    }
}

fn status_string(status: &sea_orm_active_enums::CollectionStatus) -> &'static str {
    match status {
        sea_orm_active_enums::CollectionStatus::PendingApproval => "pending_approval",
        sea_orm_active_enums::CollectionStatus::Active => "active",
        sea_orm_active_enums::CollectionStatus::PartiallyPaid => "partially_paid",
        sea_orm_active_enums::CollectionStatus::Paid => "paid",
        sea_orm_active_enums::CollectionStatus::Rejected => "rejected",
        sea_orm_active_enums::CollectionStatus::Cancelled => "cancelled",
    }
}

#[allow(clippy::result_large_err)]
fn parse_amount(s: &str) -> Result<Decimal, axum::response::Response> {
    match Decimal::from_str(s) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        Ok(_) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Amount must be greater than zero"
            })),
        )
            .into_response()),
        Err(_) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Invalid amount format"
            })),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_positive_decimals() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::new(100, 0));
        assert_eq!(parse_amount("0.01").unwrap(), Decimal::new(1, 2));
    }

    #[test]
    fn test_parse_amount_rejects_zero_negative_and_garbage() {
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("ten pesos").is_err());
    }

    #[test]
    fn test_status_string_covers_all_statuses() {
        assert_eq!(
            status_string(&sea_orm_active_enums::CollectionStatus::PendingApproval),
            "pending_approval"
        );
        assert_eq!(
            status_string(&sea_orm_active_enums::CollectionStatus::PartiallyPaid),
            "partially_paid"
        );
        assert_eq!(
            status_string(&sea_orm_active_enums::CollectionStatus::Cancelled),
            "cancelled"
        );
    }
}
