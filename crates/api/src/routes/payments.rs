//! Payment allocation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::collection_error_response;
use crate::{AppState, extractors::ActorId};
use utang_db::entities::collection_payments;
use utang_db::repositories::AllocationRepository;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/payments/{payment_id}/allocate", post(allocate_payment))
}

/// Request body for allocating a payment.
#[derive(Debug, Deserialize)]
pub struct AllocatePaymentRequest {
    /// The actor's wallet to realize the payment against.
    pub wallet_id: Uuid,
}

/// Response for a collection payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Owning collection ID.
    pub collection_id: Uuid,
    /// Payment amount.
    pub amount: String,
    /// When the payment happened.
    pub paid_at: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Realized income record on the creditor side, if allocated.
    pub creditor_income_id: Option<Uuid>,
    /// Realized expense record on the debtor side, if allocated.
    pub debtor_expense_id: Option<Uuid>,
    /// Created at timestamp.
    pub created_at: String,
}

impl PaymentResponse {
    /// Builds the response from a payment row.
    #[must_use]
    pub fn from_model(payment: &collection_payments::Model) -> Self {
        Self {
            id: payment.id,
            collection_id: payment.collection_id,
            amount: payment.amount.to_string(),
            paid_at: payment.paid_at.to_rfc3339(),
            notes: payment.notes.clone(),
            creditor_income_id: payment.creditor_income_id,
            debtor_expense_id: payment.debtor_expense_id,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// POST `/payments/{payment_id}/allocate` - Realize the actor's side of a
/// payment against one of their wallets.
async fn allocate_payment(
    State(state): State<AppState>,
    actor: ActorId,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<AllocatePaymentRequest>,
) -> impl IntoResponse {
    let repo = AllocationRepository::new((*state.db).clone());

    match repo
        .allocate(payment_id, actor.user_id(), request.wallet_id)
        .await
    {
        Ok(payment) => {
            (StatusCode::OK, Json(PaymentResponse::from_model(&payment))).into_response()
        }
        Err(e) => collection_error_response(&e),
    }
}
