//! Bridge between a platform navigation component and a store

use crate::{
    Error, NavigationEvent, Result, RouterCancel, RouterError, RouterNavigated, RouterNavigating,
};
use reflux_core::{Action, Store, StoreState, WeakStore};
use std::sync::Arc;

/// Receiver of navigation lifecycle callbacks
pub trait NavigationListener: Send + Sync {
    fn on_navigating(&self, event: NavigationEvent) -> Result<()>;
    fn on_navigated(&self, event: NavigationEvent) -> Result<()>;
    fn on_failed(&self, event: NavigationEvent, message: String) -> Result<()>;
    fn on_canceled(&self, event: NavigationEvent) -> Result<()>;
}

/// A platform navigation component
///
/// Implementations call the attached listener from their own lifecycle
/// hooks. At most one listener is attached at a time.
pub trait NavigationAdapter {
    fn attach(&mut self, listener: Arc<dyn NavigationListener>);
    fn detach(&mut self);
}

/// Turns navigation callbacks into dispatched router actions
///
/// Holds the store weakly: once the store is gone every callback fails with
/// [`Error::StoreDropped`].
pub struct RouterBridge<S> {
    store: WeakStore<S>,
}

impl<S: StoreState> RouterBridge<S> {
    pub fn new(store: &Store<S>) -> Self {
        Self {
            store: store.downgrade(),
        }
    }

    /// Create a bridge and attach it to `adapter`
    pub fn connect(store: &Store<S>, adapter: &mut impl NavigationAdapter) -> Arc<Self> {
        let bridge = Arc::new(Self::new(store));
        adapter.attach(Arc::clone(&bridge) as Arc<dyn NavigationListener>);
        tracing::debug!("router bridge connected");
        bridge
    }

    fn dispatch<A: Action>(&self, action: A) -> Result<()> {
        let store = self.store.upgrade().ok_or(Error::StoreDropped)?;
        tracing::trace!(tag = action.tag(), "navigation event");
        store.dispatch(action)?;
        Ok(())
    }
}

impl<S: StoreState> NavigationListener for RouterBridge<S> {
    fn on_navigating(&self, event: NavigationEvent) -> Result<()> {
        self.dispatch(RouterNavigating { event })
    }

    fn on_navigated(&self, event: NavigationEvent) -> Result<()> {
        self.dispatch(RouterNavigated { event })
    }

    fn on_failed(&self, event: NavigationEvent, message: String) -> Result<()> {
        tracing::warn!(path = %event.path, %message, "navigation failed");
        self.dispatch(RouterError { event, message })
    }

    fn on_canceled(&self, event: NavigationEvent) -> Result<()> {
        self.dispatch(RouterCancel { event })
    }
}
