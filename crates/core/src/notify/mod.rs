//! Collaborator seam for notification dispatch.
//!
//! Notifications are a fire-and-forget side channel: a failed dispatch is
//! logged by the caller and never fails the primary operation, which has
//! already committed by the time the notifier runs.

use async_trait::async_trait;
use thiserror::Error;
use utang_shared::types::UserId;

/// Error raised by a notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel could not deliver the notification.
    #[error("Notification channel unavailable: {0}")]
    Channel(String),
}

/// Delivers in-app notifications to registered users.
///
/// Implementations must not block the calling operation on delivery;
/// the shipped implementation simply emits a structured log event.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatches a notification to `recipient`.
    ///
    /// `link` is an application-relative path the client can deep-link to,
    /// e.g. a pending allocation action.
    async fn notify(
        &self,
        recipient: UserId,
        title: &str,
        body: &str,
        link: &str,
    ) -> Result<(), NotifyError>;
}
