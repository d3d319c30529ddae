//! Core types for the announcer.

use std::fmt;
use std::sync::Arc;

/// Ordering key of a subscription. Lower values are notified first.
pub type Priority = i32;

/// Boxed error a fallible callback can report.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a single callback invocation.
pub type CallbackResult = std::result::Result<(), BoxError>;

/// A shared subscriber callback.
///
/// Every registered callback is stored in this form. Registering the same
/// `Arc` twice creates two independent subscriptions that can still be told
/// apart from other callbacks by pointer identity.
pub type Callback<T> = Arc<dyn Fn(&T) -> CallbackResult + Send + Sync + 'static>;

/// Wrap an infallible closure into a [`Callback`].
pub fn callback<T, F>(f: F) -> Callback<T>
where
    T: 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Arc::new(move |value: &T| -> CallbackResult {
        f(value);
        Ok(())
    })
}

/// Wrap a fallible closure into a [`Callback`].
pub fn fallible_callback<T, F, E>(f: F) -> Callback<T>
where
    T: 'static,
    F: Fn(&T) -> std::result::Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError> + 'static,
{
    Arc::new(move |value: &T| -> CallbackResult { f(value).map_err(Into::into) })
}

/// Unique identifier for a subscription within one announcer.
///
/// Ids are allocated in increasing order and never reused, so comparing two
/// ids tells which subscription was registered first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
