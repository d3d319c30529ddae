//! Ready-made priority predicates for [`Announcer::notify_filtered`].
//!
//! Any `Fn(Priority) -> bool` works as a filter; these are the common ones.
//!
//! ```
//! use announcer::{filter, Announcer};
//!
//! let announcer: Announcer<&str> = Announcer::new();
//! announcer.subscribe(-5, |_| {});
//! announcer.subscribe(10, |_| {});
//! announcer.notify_filtered(&"urgent", filter::below(0)).unwrap();
//! ```
//!
//! [`Announcer::notify_filtered`]: crate::Announcer::notify_filtered

use crate::types::Priority;
use std::ops::RangeBounds;

/// Priorities greater than or equal to `min`.
pub fn at_least(min: Priority) -> impl Fn(Priority) -> bool + Copy {
    move |p| p >= min
}

/// Priorities less than or equal to `max`.
pub fn at_most(max: Priority) -> impl Fn(Priority) -> bool + Copy {
    move |p| p <= max
}

/// Priorities strictly greater than `bound`.
pub fn above(bound: Priority) -> impl Fn(Priority) -> bool + Copy {
    move |p| p > bound
}

/// Priorities strictly less than `bound`.
pub fn below(bound: Priority) -> impl Fn(Priority) -> bool + Copy {
    move |p| p < bound
}

/// Exactly one priority.
pub fn exactly(priority: Priority) -> impl Fn(Priority) -> bool + Copy {
    move |p| p == priority
}

/// Priorities inside `range` (`0..10`, `..=3`, `5..` and so on).
pub fn within<R>(range: R) -> impl Fn(Priority) -> bool
where
    R: RangeBounds<Priority>,
{
    move |p| range.contains(&p)
}

/// Even priorities, negative ones included.
pub fn even() -> impl Fn(Priority) -> bool + Copy {
    |p: Priority| p % 2 == 0
}

/// Odd priorities, negative ones included.
pub fn odd() -> impl Fn(Priority) -> bool + Copy {
    |p: Priority| p % 2 != 0
}

/// Inverts another filter.
pub fn not<F>(filter: F) -> impl Fn(Priority) -> bool
where
    F: Fn(Priority) -> bool,
{
    move |p| !filter(p)
}
