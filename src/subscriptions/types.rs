//! Subscription handles.

use crate::types::{Priority, SubscriptionId};
use std::fmt;
use std::sync::Weak;

/// Removal side of a registry, as seen by handles.
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
    fn is_subscribed(&self, id: SubscriptionId) -> bool;
}

/// Id and priority of a registered subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionInfo {
    pub id: SubscriptionId,
    pub priority: Priority,
}

/// Handle to cancel a subscription.
///
/// Cancelling is idempotent and can happen from anywhere, including from
/// inside a callback while a notify pass is running. The handle only holds a
/// weak reference: it never keeps the announcer alive, and cancelling after
/// the announcer is gone does nothing.
///
/// Dropping a handle does **not** cancel the subscription; use
/// [`into_guard`](Self::into_guard) for that.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    priority: Priority,
    registry: Weak<dyn Unsubscribe>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        id: SubscriptionId,
        priority: Priority,
        registry: Weak<dyn Unsubscribe>,
    ) -> Self {
        Self {
            id,
            priority,
            registry,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Cancel the subscription.
    ///
    /// Returns true only for the call that actually removed it.
    pub fn cancel(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.unsubscribe(self.id))
    }

    /// Whether the subscription is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.is_subscribed(self.id))
    }

    /// Turn this handle into a guard that cancels on drop.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard {
            handle: self,
            armed: true,
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Scoped subscription: cancelled when the guard goes out of scope.
#[must_use = "dropping the guard cancels the subscription immediately"]
pub struct SubscriptionGuard {
    handle: SubscriptionHandle,
    armed: bool,
}

impl SubscriptionGuard {
    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    /// Keep the subscription and get the plain handle back.
    pub fn release(mut self) -> SubscriptionHandle {
        self.armed = false;
        self.handle.clone()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.handle.cancel();
        }
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("handle", &self.handle)
            .field("armed", &self.armed)
            .finish()
    }
}
