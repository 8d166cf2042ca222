//! Push-based streams
//!
//! A small synchronous reactive layer: a [`Subject`] multicasts values to its
//! observers in subscription order, an [`Observable`] describes how to
//! subscribe (optionally through operators), and a [`Subscription`] releases
//! the observer when dropped.
//!
//! Delivery is synchronous: `Subject::next` returns once every observer has
//! run. There is no buffering or replay.

use crate::Result;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback receiving every notification of a stream
pub type Observer<T> = Box<dyn FnMut(Result<T>) + Send>;

/// Handle to a live subscription
///
/// Dropping it unsubscribes; call [`Subscription::detach`] to keep the
/// observer alive for the lifetime of its source instead.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Subscription running `teardown` when released
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Subscription with nothing to release
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Release the observer now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the observer subscribed for as long as its source lives
    pub fn detach(mut self) {
        self.teardown = None;
    }

    /// Whether this handle still owns a live observer
    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct Slot<T> {
    active: Arc<AtomicBool>,
    observer: Arc<Mutex<Observer<T>>>,
}

struct SubjectInner<T> {
    next_id: AtomicU64,
    slots: Mutex<IndexMap<u64, Slot<T>>>,
}

/// Multicast source: every value passed to [`Subject::next`] reaches every
/// observer subscribed at that moment
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                next_id: AtomicU64::new(0),
                slots: Mutex::new(IndexMap::new()),
            }),
        }
    }

    /// Register an observer
    pub fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner.slots.lock().insert(
            id,
            Slot {
                active: Arc::clone(&active),
                observer: Arc::new(Mutex::new(observer)),
            },
        );

        let inner: Weak<SubjectInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            active.store(false, Ordering::Release);
            if let Some(inner) = inner.upgrade() {
                inner.slots.lock().shift_remove(&id);
            }
        })
    }

    /// Deliver a value to every current observer, in subscription order
    ///
    /// The registry lock is not held while observers run, so observers may
    /// subscribe or unsubscribe from inside their callback. An observer
    /// released mid-delivery is skipped.
    pub fn next(&self, value: &T) {
        let targets: Vec<(Arc<AtomicBool>, Arc<Mutex<Observer<T>>>)> = self
            .inner
            .slots
            .lock()
            .values()
            .map(|slot| (Arc::clone(&slot.active), Arc::clone(&slot.observer)))
            .collect();

        for (active, observer) in targets {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            let mut guard = observer.lock();
            (*guard)(Ok(value.clone()));
        }
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Turn this subject into a subscribable stream
    pub fn as_observable(&self) -> Observable<T> {
        let subject = self.clone();
        Observable::new(move |observer| subject.subscribe(observer))
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// A description of a stream; nothing happens until it is subscribed
pub struct Observable<T> {
    subscribe: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Arc::clone(&self.subscribe),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Build a stream from its subscribe function
    pub fn new<F>(subscribe: F) -> Self
    where
        F: Fn(Observer<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            subscribe: Arc::new(subscribe),
        }
    }

    /// Subscribe with a callback for values; errors are logged and dropped
    pub fn subscribe<F>(&self, mut on_next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_result(move |notification| match notification {
            Ok(value) => on_next(value),
            Err(error) => tracing::warn!(%error, "unhandled stream error"),
        })
    }

    /// Subscribe with a callback that also sees errors
    pub fn subscribe_result<F>(&self, on_notification: F) -> Subscription
    where
        F: FnMut(Result<T>) + Send + 'static,
    {
        (self.subscribe)(Box::new(on_notification))
    }

    /// Build an operator: `wrap` turns the downstream observer into the
    /// observer handed to this stream
    fn lift<U, W>(&self, wrap: W) -> Observable<U>
    where
        U: Send + 'static,
        W: Fn(Observer<U>) -> Observer<T> + Send + Sync + 'static,
    {
        let source = self.clone();
        Observable::new(move |downstream| (source.subscribe)(wrap(downstream)))
    }

    /// Transform every value
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move |mut downstream: Observer<U>| {
            let f = Arc::clone(&f);
            let observer: Observer<T> =
                Box::new(move |notification: Result<T>| downstream(notification.map(|v| f(v))));
            observer
        })
    }

    /// Transform every value with a fallible function
    pub fn try_map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move |mut downstream: Observer<U>| {
            let f = Arc::clone(&f);
            let observer: Observer<T> = Box::new(move |notification: Result<T>| {
                downstream(notification.and_then(|v| f(v)))
            });
            observer
        })
    }

    /// Keep only values matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> Observable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.lift(move |mut downstream: Observer<T>| {
            let predicate = Arc::clone(&predicate);
            let observer: Observer<T> = Box::new(move |notification: Result<T>| match notification {
                Ok(value) if !predicate(&value) => {}
                other => downstream(other),
            });
            observer
        })
    }

    /// Map and filter in one step
    pub fn filter_map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move |mut downstream: Observer<U>| {
            let f = Arc::clone(&f);
            let observer: Observer<T> = Box::new(move |notification: Result<T>| match notification {
                Ok(value) => {
                    if let Some(mapped) = f(value) {
                        downstream(Ok(mapped));
                    }
                }
                Err(error) => downstream(Err(error)),
            });
            observer
        })
    }

    /// Run a side effect on every value and pass it through
    pub fn inspect<F>(&self, f: F) -> Observable<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move |mut downstream: Observer<T>| {
            let f = Arc::clone(&f);
            let observer: Observer<T> = Box::new(move |notification: Result<T>| {
                if let Ok(value) = &notification {
                    f(value);
                }
                downstream(notification)
            });
            observer
        })
    }

    /// Drop the first `count` values of each subscription
    pub fn skip(&self, count: usize) -> Observable<T> {
        self.lift(move |mut downstream: Observer<T>| {
            let mut remaining = count;
            let observer: Observer<T> = Box::new(move |notification: Result<T>| match notification {
                Ok(_) if remaining > 0 => remaining -= 1,
                other => downstream(other),
            });
            observer
        })
    }
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
    /// Suppress values equal to the previously emitted one
    ///
    /// Errors pass through and do not reset the comparison.
    pub fn distinct_until_changed(&self) -> Observable<T> {
        self.lift(|mut downstream: Observer<T>| {
            let mut last: Option<T> = None;
            let observer: Observer<T> = Box::new(move |notification: Result<T>| match notification {
                Ok(value) => {
                    if last.as_ref() != Some(&value) {
                        last = Some(value.clone());
                        downstream(Ok(value));
                    }
                }
                Err(error) => downstream(Err(error)),
            });
            observer
        })
    }
}
