//! Priority-ordered subscription registry.

use crate::error::{AnnouncerError, Result};
use crate::types::{callback, fallible_callback, BoxError, Callback, Priority, SubscriptionId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::types::{SubscriptionHandle, SubscriptionInfo, Unsubscribe};

/// Default name used in log records.
const DEFAULT_NAME: &str = "announcer";

/// Announcer configuration.
#[derive(Clone, Debug)]
pub struct AnnouncerConfig {
    /// Label attached to every log record of this announcer.
    /// Default: "announcer"
    pub name: String,

    /// Number of subscriptions to pre-allocate room for.
    /// Default: 0
    pub initial_capacity: usize,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            initial_capacity: 0,
        }
    }
}

/// Internal subscription state.
struct Entry<T> {
    id: SubscriptionId,
    priority: Priority,
    callback: Callback<T>,
    /// Cleared once the entry leaves the registry.
    live: AtomicBool,
}

impl<T> Entry<T> {
    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn retire(&self) {
        self.live.store(false, Ordering::Release);
    }

    fn invoke(&self, value: &T) -> Result<()> {
        (self.callback)(value).map_err(|source| AnnouncerError::Callback {
            id: self.id,
            priority: self.priority,
            source,
        })
    }
}

/// State shared between an announcer, its clones and (weakly) its handles.
struct Registry<T> {
    config: AnnouncerConfig,
    /// Sorted by priority; equal priorities keep insertion order.
    entries: Mutex<Vec<Arc<Entry<T>>>>,
    /// Counter for generating subscription IDs. Only advanced under the
    /// `entries` lock, so id order matches insertion order.
    next_id: AtomicU64,
}

impl<T> Registry<T> {
    fn insert(&self, priority: Priority, callback: Callback<T>) -> SubscriptionId {
        let mut entries = self.entries.lock();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let pos = entries.partition_point(|e| e.priority <= priority);
        entries.insert(
            pos,
            Arc::new(Entry {
                id,
                priority,
                callback,
                live: AtomicBool::new(true),
            }),
        );
        id
    }

    /// Remove the entry picked by `select`, keeping the order of the rest.
    fn take<F>(&self, select: F) -> Option<Arc<Entry<T>>>
    where
        F: FnOnce(&[Arc<Entry<T>>]) -> Option<usize>,
    {
        let removed = {
            let mut entries = self.entries.lock();
            select(&entries).map(|pos| entries.remove(pos))
        };

        // Retire and drop outside the lock: dropping runs user destructors.
        if let Some(ref entry) = removed {
            entry.retire();
            debug!(
                announcer = %self.config.name,
                id = entry.id.0,
                priority = entry.priority,
                "unsubscribed"
            );
        }
        removed
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        self.take(|entries| entries.iter().position(|e| e.id == id))
            .is_some()
    }

    fn snapshot(&self) -> Vec<Arc<Entry<T>>> {
        self.entries.lock().clone()
    }
}

impl<T> Unsubscribe for Registry<T> {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.entries.lock().iter().any(|e| e.id == id)
    }
}

/// A priority-ordered announcer.
///
/// Subscribers register a callback with an integer priority and are notified
/// synchronously, on the calling thread, in ascending priority order. Equal
/// priorities are notified in the order they subscribed.
///
/// Cloning an announcer is cheap and yields another reference to the same
/// set of subscriptions.
pub struct Announcer<T> {
    registry: Arc<Registry<T>>,
}

impl<T: 'static> Announcer<T> {
    /// Create an empty announcer.
    pub fn new() -> Self {
        Self::with_config(AnnouncerConfig::default())
    }

    /// Create an empty announcer with custom configuration.
    pub fn with_config(config: AnnouncerConfig) -> Self {
        let entries = Vec::with_capacity(config.initial_capacity);
        Self {
            registry: Arc::new(Registry {
                config,
                entries: Mutex::new(entries),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Name used in log records.
    pub fn name(&self) -> &str {
        &self.registry.config.name
    }

    /// Configuration this announcer was created with.
    pub fn config(&self) -> &AnnouncerConfig {
        &self.registry.config
    }

    // --- Subscribing ---

    /// Subscribe `callback` at `priority`.
    ///
    /// Any priority is accepted, including negative and repeated ones. The
    /// returned handle cancels exactly this subscription; dropping it does not.
    pub fn subscribe<F>(&self, priority: Priority, callback_fn: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_shared(priority, callback(callback_fn))
    }

    /// Subscribe a callback that may fail.
    ///
    /// An `Err` returned during a notify pass aborts the pass and is handed
    /// to the caller of [`notify`](Self::notify) as [`AnnouncerError::Callback`].
    pub fn try_subscribe<F, E>(
        &self,
        priority: Priority,
        callback_fn: F,
    ) -> SubscriptionHandle
    where
        F: Fn(&T) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        self.subscribe_shared(priority, fallible_callback(callback_fn))
    }

    /// Subscribe an already shared callback.
    ///
    /// The same `Arc` may be subscribed several times; see
    /// [`remove_callback`](Self::remove_callback).
    pub fn subscribe_shared(
        &self,
        priority: Priority,
        callback: Callback<T>,
    ) -> SubscriptionHandle {
        let id = self.registry.insert(priority, callback);
        debug!(announcer = %self.name(), id = id.0, priority, "subscribed");
        self.handle(id, priority)
    }

    fn handle(&self, id: SubscriptionId, priority: Priority) -> SubscriptionHandle {
        let registry: Weak<dyn Unsubscribe> =
            Arc::downgrade(&self.registry) as Weak<dyn Unsubscribe>;
        SubscriptionHandle::new(id, priority, registry)
    }

    // --- Removing ---

    /// Remove a subscription by id. Returns whether anything was removed;
    /// unknown or already removed ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.remove(id)
    }

    /// Remove one subscription of `callback`, matched by pointer identity.
    ///
    /// If the callback is subscribed more than once, the earliest
    /// subscription (lowest id) is removed, whatever its priority.
    pub fn remove_callback(&self, callback: &Callback<T>) -> bool {
        self.registry
            .take(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| Arc::ptr_eq(&e.callback, callback))
                    .min_by_key(|(_, e)| e.id)
                    .map(|(pos, _)| pos)
            })
            .is_some()
    }

    /// Remove every subscription.
    pub fn clear(&self) {
        let drained: Vec<_> = self.registry.entries.lock().drain(..).collect();
        for entry in &drained {
            entry.retire();
        }
        debug!(announcer = %self.name(), removed = drained.len(), "cleared");
    }

    // --- Notifying ---

    /// Notify every subscription with `value`, lowest priority first.
    ///
    /// The set of subscriptions is fixed when the call starts: subscriptions
    /// added by a callback are not notified by this pass. A subscription
    /// cancelled during the pass is not invoked once cancelled. If a callback
    /// fails, the remaining subscriptions are skipped and the error is returned.
    pub fn notify(&self, value: &T) -> Result<()> {
        self.dispatch(value, |_| true)
    }

    /// Notify the subscriptions whose priority satisfies `predicate`.
    ///
    /// Ordering and failure handling are the same as for [`notify`](Self::notify).
    /// The predicate is called once per subscription in the pass.
    pub fn notify_filtered<P>(&self, value: &T, predicate: P) -> Result<()>
    where
        P: Fn(Priority) -> bool,
    {
        self.dispatch(value, predicate)
    }

    fn dispatch<P>(&self, value: &T, predicate: P) -> Result<()>
    where
        P: Fn(Priority) -> bool,
    {
        let snapshot = self.registry.snapshot();
        trace!(announcer = %self.name(), subscriptions = snapshot.len(), "notify");

        for entry in &snapshot {
            // Removed since the snapshot was taken.
            if !entry.is_live() {
                continue;
            }
            if !predicate(entry.priority) {
                continue;
            }
            if let Err(err) = entry.invoke(value) {
                debug!(announcer = %self.name(), error = %err, "notify aborted");
                return Err(err);
            }
        }
        Ok(())
    }

    // --- Inspection ---

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.registry.entries.lock().len()
    }

    /// Whether no subscription is registered.
    pub fn is_empty(&self) -> bool {
        self.subscription_count() == 0
    }

    /// Whether the subscription with `id` is still registered.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.registry.is_subscribed(id)
    }

    /// Current subscriptions, in notification order.
    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.registry
            .entries
            .lock()
            .iter()
            .map(|e| SubscriptionInfo {
                id: e.id,
                priority: e.priority,
            })
            .collect()
    }
}

impl<T: 'static> Default for Announcer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Announcer<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Announcer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("name", &self.registry.config.name)
            .field("subscriptions", &self.registry.entries.lock().len())
            .finish()
    }
}
