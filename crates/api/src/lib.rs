//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for the collection lifecycle
//! - The actor extractor (explicit `X-Actor-Id`, no ambient session)
//! - Response types and error mapping
//! - The log-backed notification dispatcher

pub mod extractors;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use utang_core::notify::{Notifier, NotifyError};
use utang_shared::types::UserId;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Notification dispatcher.
    pub notifier: Arc<dyn Notifier>,
}

/// Notifier that records deliveries as structured log events.
///
/// Stands in for the in-app/email/push channels, which are outside this
/// service; delivery is observable without ever failing an operation.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        recipient: UserId,
        title: &str,
        body: &str,
        link: &str,
    ) -> Result<(), NotifyError> {
        info!(%recipient, title, body, link, "notification dispatched");
        Ok(())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
