//! Request extractors.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;
use uuid::Uuid;

/// Extracts the acting user from the `X-Actor-Id` header.
///
/// The actor is always passed explicitly; there is no ambient session
/// state. A deployment fronts this service with its own authentication
/// layer, which asserts the header.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Returns the actor's user id.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "missing_actor",
                        "message": "X-Actor-Id header is required"
                    })),
                )
            })?;

        let actor_id = Uuid::parse_str(header).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_actor",
                    "message": "X-Actor-Id must be a UUID"
                })),
            )
        })?;

        Ok(Self(actor_id))
    }
}
