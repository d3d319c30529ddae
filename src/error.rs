//! Error types for the announcer.

use crate::types::{BoxError, Priority, SubscriptionId};
use thiserror::Error;

/// Main error type for announcer operations.
///
/// Registering and removing subscriptions never fails; the only error source
/// is a subscriber callback that reports a failure during a notify pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnnouncerError {
    #[error("Subscription {id} (priority {priority}) failed: {source}")]
    Callback {
        id: SubscriptionId,
        priority: Priority,
        #[source]
        source: BoxError,
    },
}

impl AnnouncerError {
    /// Id of the subscription whose callback failed.
    pub fn subscription_id(&self) -> SubscriptionId {
        match self {
            AnnouncerError::Callback { id, .. } => *id,
        }
    }
}

/// Result type for announcer operations.
pub type Result<T> = std::result::Result<T, AnnouncerError>;
