//! Effects: side-effect pipelines attached to a store
//!
//! An [`Effect`] pairs a name with a factory that builds a stream from the
//! store (usually from [`Store::observe`](crate::Store::observe) or
//! [`Store::select`](crate::Store::select)). A dispatching effect feeds every
//! value it produces back into the store; a non-dispatching effect only
//! observes.
//!
//! ```
//! use reflux_core::{Action, Effect, Reducers, Store};
//!
//! #[derive(Debug)]
//! struct Ping;
//! impl Action for Ping {}
//!
//! #[derive(Debug)]
//! struct Pong;
//! impl Action for Pong {}
//!
//! let store = Store::new(
//!     Reducers::new().on(|n: &u32, _: &Pong| n + 1),
//!     0u32,
//! );
//! store
//!     .register_effects([Effect::dispatching("ping_pong", |store: &Store<u32>| {
//!         store.observe::<Ping>().map(|_| Pong)
//!     })])
//!     .unwrap();
//!
//! store.dispatch(Ping).unwrap();
//! assert_eq!(*store.state(), 1);
//! ```

use crate::{ActionRef, Observable, Result, Store, StoreState, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type EffectFactory<S> = Arc<dyn Fn(&Store<S>) -> Observable<Option<ActionRef>> + Send + Sync>;

/// A named side-effect pipeline
pub struct Effect<S> {
    name: String,
    dispatches: bool,
    factory: EffectFactory<S>,
}

impl<S> Clone for Effect<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            dispatches: self.dispatches,
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<S> fmt::Debug for Effect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("name", &self.name)
            .field("dispatches", &self.dispatches)
            .finish()
    }
}

impl<S: StoreState> Effect<S> {
    /// Effect whose emitted actions are dispatched back into the store
    pub fn dispatching<A, F>(name: impl Into<String>, factory: F) -> Self
    where
        A: crate::Action,
        F: Fn(&Store<S>) -> Observable<A> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dispatches: true,
            factory: Arc::new(move |store: &Store<S>| {
                factory(store).map(|action| Some(Arc::new(action) as ActionRef))
            }),
        }
    }

    /// Dispatching effect producing already type-erased actions, for
    /// pipelines that emit more than one action type
    pub fn dispatching_refs<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Store<S>) -> Observable<ActionRef> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dispatches: true,
            factory: Arc::new(move |store: &Store<S>| factory(store).map(Some)),
        }
    }

    /// Effect that only observes; its values are discarded
    pub fn non_dispatching<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Send + 'static,
        F: Fn(&Store<S>) -> Observable<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dispatches: false,
            factory: Arc::new(move |store: &Store<S>| factory(store).map(|_| None::<ActionRef>)),
        }
    }

    /// Identity of the effect within a store
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dispatches(&self) -> bool {
        self.dispatches
    }

    /// Instantiate the factory and subscribe to the resulting stream
    ///
    /// `failure` receives the message of the first stream error, including
    /// one raised synchronously during subscription.
    pub(crate) fn start(
        &self,
        store: &Store<S>,
        failure: Arc<Mutex<Option<String>>>,
    ) -> Subscription {
        let stream = (self.factory)(store);
        let weak = store.downgrade();
        let name = self.name.clone();
        let dispatches = self.dispatches;

        stream.subscribe_result(move |notification: Result<Option<ActionRef>>| {
            match notification {
                Ok(Some(action)) if dispatches => {
                    let Some(store) = weak.upgrade() else { return };
                    if let Err(error) = store.dispatch_ref(action) {
                        tracing::error!(effect = %name, %error, "dispatch from effect failed");
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(effect = %name, %error, "effect stream failed, terminating");
                    failure.lock().get_or_insert_with(|| error.to_string());
                    if let Some(store) = weak.upgrade() {
                        store.terminate_effect(&name);
                    }
                }
            }
        })
    }
}
