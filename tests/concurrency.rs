//! Reentrancy and multi-threaded access.

use announcer::{callback, Announcer, Callback, SubscriptionHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

// --- Reentrancy ---

#[test]
fn test_callback_cancels_itself() {
    init_tracing();
    let announcer: Announcer<u32> = Announcer::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let own: Arc<OnceLock<SubscriptionHandle>> = Arc::default();

    let counter = Arc::clone(&calls);
    let slot = Arc::clone(&own);
    let handle = announcer.subscribe(0, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = slot.get() {
            handle.cancel();
        }
    });
    own.set(handle).unwrap();

    announcer.notify(&1).unwrap();
    announcer.notify(&2).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(announcer.is_empty());
}

#[test]
fn test_subscription_added_during_pass_not_observed() {
    init_tracing();
    let announcer: Announcer<u32> = Announcer::new();
    let late_calls = Arc::new(AtomicUsize::new(0));

    let registry = announcer.clone();
    let counter = Arc::clone(&late_calls);
    let added = Arc::new(AtomicUsize::new(0));
    let added_flag = Arc::clone(&added);
    announcer.subscribe(0, move |_| {
        if added_flag.fetch_add(1, Ordering::SeqCst) == 0 {
            let counter = Arc::clone(&counter);
            // Higher priority than the caller: would run later in this pass.
            registry.subscribe(10, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    announcer.notify(&1).unwrap();
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);

    announcer.notify(&2).unwrap();
    assert_eq!(late_calls.load(Ordering::SeqCst), 1);

    // The callback holds a clone of the announcer; break the cycle.
    announcer.clear();
}

#[test]
fn test_cancel_during_pass_skips_later_subscriptions() {
    init_tracing();
    let announcer: Announcer<u32> = announcer::create();
    let order = Arc::new(Mutex::new(Vec::new()));
    let later: Arc<OnceLock<Vec<SubscriptionHandle>>> = Arc::default();

    let slot = Arc::clone(&later);
    let log = Arc::clone(&order);
    announcer.subscribe(0, move |_| {
        log.lock().unwrap().push(0);
        for handle in slot.get().into_iter().flatten() {
            handle.cancel();
        }
    });
    let handles = (1..4)
        .map(|p| {
            let log = Arc::clone(&order);
            announcer.subscribe(p, move |_| log.lock().unwrap().push(p))
        })
        .collect();
    later.set(handles).unwrap();

    announcer.notify(&0).unwrap();

    assert_eq!(*order.lock().unwrap(), vec![0]);
    assert_eq!(announcer.subscription_count(), 1);
}

#[test]
fn test_nested_notify_from_callback() {
    init_tracing();
    let announcer: Announcer<u32> = Announcer::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let registry = announcer.clone();
    let log = Arc::clone(&seen);
    announcer.subscribe(0, move |v| {
        log.lock().unwrap().push(*v);
        if *v > 0 {
            registry.notify(&(*v - 1)).unwrap();
        }
    });

    announcer.notify(&3).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![3, 2, 1, 0]);

    announcer.clear();
}

// --- Threads ---

#[test]
fn test_concurrent_subscribe_and_notify() {
    init_tracing();
    let announcer: Announcer<usize> = Announcer::new();
    let total = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let announcer = announcer.clone();
            let total = Arc::clone(&total);
            thread::spawn(move || {
                for i in 0..50 {
                    let total = Arc::clone(&total);
                    let handle = announcer.subscribe((t * 50 + i) as i32, move |v| {
                        total.fetch_add(*v, Ordering::SeqCst);
                    });
                    announcer.notify(&0).unwrap();
                    if i % 2 == 0 {
                        handle.cancel();
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(announcer.subscription_count(), 8 * 25);
    total.store(0, Ordering::SeqCst);
    announcer.notify(&1).unwrap();
    assert_eq!(total.load(Ordering::SeqCst), 8 * 25);

    let priorities: Vec<i32> = announcer.subscriptions().iter().map(|s| s.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
}

#[test]
fn test_concurrent_equal_priority_keeps_insertion_order() {
    init_tracing();
    let announcer: Announcer<()> = Announcer::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let announcer = announcer.clone();
            let order = Arc::clone(&order);
            thread::spawn(move || {
                for _ in 0..50 {
                    let order = Arc::clone(&order);
                    let own: Arc<OnceLock<SubscriptionHandle>> = Arc::default();
                    let slot = Arc::clone(&own);
                    let handle = announcer.subscribe(0, move |_| {
                        if let Some(handle) = slot.get() {
                            order.lock().unwrap().push(handle.id());
                        }
                    });
                    own.set(handle).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    announcer.notify(&()).unwrap();

    let notified = order.lock().unwrap().clone();
    let mut by_id = notified.clone();
    by_id.sort();
    assert_eq!(notified.len(), 8 * 50);
    assert_eq!(notified, by_id);

    let listed: Vec<_> = announcer.subscriptions().iter().map(|s| s.id).collect();
    assert_eq!(listed, notified);
}

#[test]
fn test_remove_callback_after_concurrent_subscribe() {
    init_tracing();
    let announcer: Announcer<()> = Announcer::new();
    let shared: Callback<()> = callback(|_: &()| {});

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let announcer = announcer.clone();
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..25 {
                    announcer.subscribe_shared(0, Arc::clone(&shared));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // Same priority everywhere: the earliest subscription is notified first.
    let first = announcer.subscriptions()[0].id;
    assert!(announcer.remove_callback(&shared));
    assert!(!announcer.contains(first));
    assert_eq!(announcer.subscription_count(), 8 * 25 - 1);
}

#[test]
fn test_concurrent_cancel_of_same_handle() {
    init_tracing();
    let announcer: Announcer<()> = Announcer::new();
    let handle = announcer.subscribe(0, |_| {});

    let removed: usize = (0..8)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || handle.cancel())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|worker| worker.join().unwrap() as usize)
        .sum();

    assert_eq!(removed, 1);
    assert!(announcer.is_empty());
}
