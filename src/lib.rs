//! # Announcer
//!
//! A priority-ordered, synchronous publish/subscribe registry.
//!
//! ## Core Concepts
//!
//! - **Subscriptions**: a callback registered with an integer priority
//! - **Notification**: every subscription is called with the published value,
//!   lowest priority first, ties in subscription order
//! - **Filtering**: notify only the subscriptions whose priority passes a predicate
//! - **Cancellation**: idempotent, through a handle, a scoped guard, an id or
//!   the callback itself
//!
//! ## Example
//!
//! ```
//! use announcer::{filter, Announcer};
//! use std::sync::{Arc, Mutex};
//!
//! let announcer: Announcer<&str> = announcer::create();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! for priority in [2, 0, 1] {
//!     let seen = Arc::clone(&seen);
//!     announcer.subscribe(priority, move |value| {
//!         seen.lock().unwrap().push((priority, *value));
//!     });
//! }
//!
//! announcer.notify(&"all")?;
//! announcer.notify_filtered(&"some", filter::at_least(1))?;
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![(0, "all"), (1, "all"), (2, "all"), (1, "some"), (2, "some")]
//! );
//! # Ok::<(), announcer::AnnouncerError>(())
//! ```

pub mod error;
pub mod filter;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{AnnouncerError, Result};
pub use subscriptions::{
    Announcer, AnnouncerConfig, SubscriptionGuard, SubscriptionHandle, SubscriptionInfo,
};
pub use types::*;

/// Create a fresh, empty announcer with the default configuration.
pub fn create<T: 'static>() -> Announcer<T> {
    Announcer::new()
}
