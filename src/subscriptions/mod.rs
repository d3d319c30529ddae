//! Priority-ordered subscriptions.
//!
//! This module provides the announcer registry:
//! - Subscriptions carry an integer priority; lower priorities run first
//! - Equal priorities run in subscription order
//! - Filtered notification by priority predicate
//! - Idempotent cancellation through handles, guards, ids or callback identity
//!
//! Notification is synchronous. Each pass works on a snapshot taken when it
//! starts and skips entries cancelled since. Callbacks run without any lock
//! held, so they may subscribe, cancel or notify again.
//!
//! # Example
//!
//! ```
//! use announcer::Announcer;
//!
//! let announcer: Announcer<String> = Announcer::new();
//!
//! let audit = announcer.subscribe(10, |msg| println!("audit: {}", msg));
//! announcer.subscribe(-1, |msg| println!("first: {}", msg));
//!
//! announcer.notify(&"hello".to_string())?;
//!
//! audit.cancel();
//! announcer.notify_filtered(&"quiet".to_string(), |p| p < 0)?;
//! # Ok::<(), announcer::AnnouncerError>(())
//! ```

mod registry;
mod types;

pub use registry::{Announcer, AnnouncerConfig};
pub use types::{SubscriptionGuard, SubscriptionHandle, SubscriptionInfo};
