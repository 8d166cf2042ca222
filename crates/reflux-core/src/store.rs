//! The store: single source of truth
//!
//! [`Store::dispatch`] is the only way to change state. Each action is run
//! through the reducers, the new state is swapped in, a snapshot is
//! recorded, then action observers and state/selector subscribers are
//! notified, all before the next action is looked at.
//!
//! # Dispatch turns
//!
//! Writers are serialized by a re-entrant lock. A dispatch (or reset, or
//! time-travel request) issued from inside a notification, typically by an
//! effect, does not run inline: it is queued and drained in FIFO order by the
//! outermost call, which returns only once the queue is empty. Cascades
//! therefore complete before control goes back to the original caller, and
//! every observer sees actions in one total order.

use crate::{
    action::downcast_action,
    history::{History, Snapshot},
    selector::Memoized,
    Action, ActionRef, Effect, Error, Observable, Observer, Reducers, Result, Selector,
    StoreConfig, Subject, Subscription,
};
use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// Bounds every state type must meet
pub trait StoreState: PartialEq + Send + Sync + 'static {}

impl<T: PartialEq + Send + Sync + 'static> StoreState for T {}

struct StoreInner<S> {
    config: StoreConfig,
    reducers: Reducers<S>,
    initial: Arc<S>,
    state: RwLock<Arc<S>>,
    /// Held for the duration of a dispatch turn; the flag marks a running drain
    turn_lock: ReentrantMutex<Cell<bool>>,
    queue: Mutex<VecDeque<Command>>,
    history: Mutex<Option<History<S>>>,
    effects: Mutex<IndexMap<String, Subscription>>,
    selectors: Mutex<Vec<Weak<dyn Memoized>>>,
    actions: Subject<ActionRef>,
    states: Subject<Arc<S>>,
}

/// A unit of work for the writer
enum Command {
    Dispatch(ActionRef),
    Travel(Travel),
    Reset,
}

#[derive(Debug, Clone, Copy)]
enum Travel {
    JumpTo(u64),
    Undo,
    Redo,
}

/// Resets the drain flag even if a reducer or subscriber panics
struct DrainGuard<'a> {
    draining: &'a Cell<bool>,
    queue: &'a Mutex<VecDeque<Command>>,
}

impl<'a> DrainGuard<'a> {
    fn enter(draining: &'a Cell<bool>, queue: &'a Mutex<VecDeque<Command>>) -> Self {
        draining.set(true);
        Self { draining, queue }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        // Anything still queued belongs to an aborted turn
        self.queue.lock().clear();
        self.draining.set(false);
    }
}

impl<S: StoreState> StoreInner<S> {
    /// Execute `command` now, or queue it when this thread is already
    /// draining (a call from inside a notification)
    fn submit(&self, command: Command) -> Result<()> {
        let draining = self.turn_lock.lock();
        if draining.get() {
            self.queue.lock().push_back(command);
            return Ok(());
        }
        let _guard = DrainGuard::enter(&draining, &self.queue);
        self.execute(command)?;
        self.drain()
    }

    /// Run `f` as part of a dispatch turn
    ///
    /// Commands submitted by `f` (or by observers it triggers) are queued and
    /// processed after it returns, unless an outer drain will pick them up.
    fn turn<R>(&self, f: impl FnOnce() -> R) -> (R, Result<()>) {
        let draining = self.turn_lock.lock();
        if draining.get() {
            return (f(), Ok(()));
        }
        let _guard = DrainGuard::enter(&draining, &self.queue);
        let value = f();
        (value, self.drain())
    }

    fn drain(&self) -> Result<()> {
        loop {
            let Some(command) = self.queue.lock().pop_front() else {
                return Ok(());
            };
            self.execute(command)?;
        }
    }

    fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Dispatch(action) => self.process(action),
            Command::Travel(travel) => self.travel(travel),
            Command::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    fn process(&self, action: ActionRef) -> Result<()> {
        let current = Arc::clone(&*self.state.read());
        let next = self.reducers.apply(&current, &*action)?;
        *self.state.write() = Arc::clone(&next);

        let seq = self
            .history
            .lock()
            .as_mut()
            .map(|history| history.record(Arc::clone(&next), Arc::clone(&action)));
        tracing::trace!(
            tag = action.tag(),
            ?seq,
            changed = !Arc::ptr_eq(&current, &next),
            "action committed"
        );

        self.actions.next(&action);
        self.states.next(&next);
        Ok(())
    }

    fn travel(&self, travel: Travel) -> Result<()> {
        let (seq, state) = {
            let mut history = self.history.lock();
            let history = history.as_mut().ok_or(Error::HistoryDisabled)?;
            let snapshot = match travel {
                Travel::JumpTo(seq) => history.jump_to(seq)?,
                Travel::Undo => history.undo()?,
                Travel::Redo => history.redo()?,
            };
            (snapshot.seq, Arc::clone(&snapshot.state))
        };
        tracing::debug!(?travel, seq, "time travel");
        self.replace_state(state);
        Ok(())
    }

    fn reset(&self) {
        if let Some(history) = self.history.lock().as_mut() {
            history.reset(Arc::clone(&self.initial));
        }
        let stopped = if self.config.reset_unregisters_effects {
            std::mem::take(&mut *self.effects.lock())
        } else {
            IndexMap::new()
        };
        tracing::debug!(effects_stopped = stopped.len(), "store reset");
        drop(stopped);
        self.replace_state(Arc::clone(&self.initial));
    }

    /// Replace the state without reducers (reset and time travel)
    fn replace_state(&self, state: Arc<S>) {
        *self.state.write() = Arc::clone(&state);
        self.clear_selector_caches();
        self.states.next(&state);
    }

    fn clear_selector_caches(&self) {
        let mut selectors = self.selectors.lock();
        selectors.retain(|weak| match weak.upgrade() {
            Some(selector) => {
                selector.clear();
                true
            }
            None => false,
        });
    }

    fn track_selector(&self, memo: Arc<dyn Memoized>) {
        let weak = Arc::downgrade(&memo);
        let mut selectors = self.selectors.lock();
        selectors.retain(|known| known.strong_count() > 0);
        if !selectors.iter().any(|known| known.ptr_eq(&weak)) {
            selectors.push(weak);
        }
    }
}

/// Handle to a store; clones share the same state
///
/// ```
/// use reflux_core::{Action, Reducers, Store};
///
/// #[derive(Debug)]
/// struct Rename(String);
/// impl Action for Rename {}
///
/// let store = Store::new(
///     Reducers::new().on(|_: &String, a: &Rename| a.0.clone()),
///     String::from("draft"),
/// );
/// store.dispatch(Rename("final".into())).unwrap();
/// assert_eq!(store.state().as_str(), "final");
/// ```
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("reducers", &self.inner.reducers)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle, used by effects to avoid keeping their store alive
pub struct WeakStore<S> {
    inner: Weak<StoreInner<S>>,
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S> WeakStore<S> {
    pub fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S: StoreState> Store<S> {
    /// Create a store with the default configuration
    pub fn new(reducers: Reducers<S>, initial: S) -> Self {
        Self::with_config(reducers, initial, StoreConfig::default())
    }

    /// Create a store with an explicit configuration
    pub fn with_config(reducers: Reducers<S>, initial: S, config: StoreConfig) -> Self {
        let initial = Arc::new(initial);
        let history = config
            .record_history
            .then(|| History::new(Arc::clone(&initial), config.history_limit));
        tracing::debug!(reducers = reducers.len(), ?config, "store created");

        Self {
            inner: Arc::new(StoreInner {
                config,
                reducers,
                state: RwLock::new(Arc::clone(&initial)),
                initial,
                turn_lock: ReentrantMutex::new(Cell::new(false)),
                queue: Mutex::new(VecDeque::new()),
                history: Mutex::new(history),
                effects: Mutex::new(IndexMap::new()),
                selectors: Mutex::new(Vec::new()),
                actions: Subject::new(),
                states: Subject::new(),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Latest committed state
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&*self.inner.state.read())
    }

    /// Dispatch an action
    ///
    /// Returns once the action and every action cascaded from it have been
    /// reduced and all observers notified. Called from inside a notification,
    /// the action is queued and this returns immediately.
    ///
    /// A failing reducer aborts the turn: the state stays at the last
    /// committed value, queued cascades are discarded and the error is
    /// returned to the outermost caller.
    pub fn dispatch<A: Action>(&self, action: A) -> Result<()> {
        self.dispatch_ref(Arc::new(action))
    }

    /// Dispatch an already shared action
    pub fn dispatch_ref(&self, action: ActionRef) -> Result<()> {
        self.inner.submit(Command::Dispatch(action))
    }

    /// Every dispatched action, from now on
    pub fn observe_action(&self) -> Observable<ActionRef> {
        self.inner.actions.as_observable()
    }

    /// Dispatched actions of type `A`, from now on
    pub fn observe<A: Action>(&self) -> Observable<Arc<A>> {
        self.observe_action().filter_map(downcast_action::<A>)
    }

    /// Current state at subscription, then every committed state
    fn raw_states(&self) -> Observable<Arc<S>> {
        let store = self.downgrade();
        Observable::new(move |mut observer: Observer<Arc<S>>| {
            let Some(store) = store.upgrade() else {
                return Subscription::empty();
            };
            let inner = &store.inner;
            // Re-entrant dispatches from the first emission queue up behind it
            let (subscription, result) = inner.turn(|| {
                observer(Ok(store.state()));
                inner.states.subscribe(observer)
            });
            if let Err(error) = result {
                tracing::error!(%error, "dispatch issued during subscription failed");
            }
            subscription
        })
    }

    /// The whole state: current value on subscription, then each change
    ///
    /// Commits producing a state equal to the last emitted one are skipped.
    pub fn select_state(&self) -> Observable<Arc<S>> {
        self.raw_states().distinct_until_changed()
    }

    /// A derived value: current value on subscription, then each change
    ///
    /// Emits only when the selector output differs (by value) from the
    /// previous emission. Projection errors reach this stream only.
    pub fn select<T>(&self, selector: &Selector<S, T>) -> Observable<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        self.inner.track_selector(selector.memo());
        let selector = selector.clone();
        self.raw_states()
            .try_map(move |state| selector.select(&state))
            .distinct_until_changed()
    }

    /// Start effects; an effect whose name is already running is skipped
    ///
    /// Stops at the first effect whose stream fails while starting.
    pub fn register_effects(&self, effects: impl IntoIterator<Item = Effect<S>>) -> Result<()> {
        for effect in effects {
            self.register_effect(effect)?;
        }
        Ok(())
    }

    /// Start one effect
    ///
    /// Returns `Ok(false)` when an effect with the same name is already
    /// running, and [`Error::Effect`] when the stream fails during
    /// subscription (the effect is then not registered).
    pub fn register_effect(&self, effect: Effect<S>) -> Result<bool> {
        let (registered, result) = self.inner.turn(|| {
            if self.inner.effects.lock().contains_key(effect.name()) {
                tracing::warn!(effect = effect.name(), "effect already registered");
                return Ok(false);
            }

            let failure = Arc::new(Mutex::new(None));
            let subscription = effect.start(self, Arc::clone(&failure));
            if let Some(message) = failure.lock().take() {
                return Err(Error::Effect {
                    name: effect.name().to_string(),
                    message,
                });
            }

            self.inner
                .effects
                .lock()
                .insert(effect.name().to_string(), subscription);
            tracing::debug!(
                effect = effect.name(),
                dispatches = effect.dispatches(),
                "effect registered"
            );
            Ok(true)
        });
        if let Err(error) = result {
            tracing::error!(
                effect = effect.name(),
                %error,
                "dispatch issued while starting effect failed"
            );
        }
        registered
    }

    /// Stop effects; unknown effects are ignored
    pub fn unregister_effects<'a>(&self, effects: impl IntoIterator<Item = &'a Effect<S>>) {
        for effect in effects {
            self.unregister_effect(effect.name());
        }
    }

    /// Stop the effect called `name`, returning whether it was running
    pub fn unregister_effect(&self, name: &str) -> bool {
        let removed = self.inner.effects.lock().shift_remove(name);
        match removed {
            Some(subscription) => {
                subscription.unsubscribe();
                tracing::debug!(effect = name, "effect unregistered");
                true
            }
            None => {
                tracing::debug!(effect = name, "effect not registered");
                false
            }
        }
    }

    /// Names of running effects, in registration order
    pub fn registered_effects(&self) -> Vec<String> {
        self.inner.effects.lock().keys().cloned().collect()
    }

    /// Called by an effect whose stream failed
    pub(crate) fn terminate_effect(&self, name: &str) {
        let removed = self.inner.effects.lock().shift_remove(name);
        drop(removed);
    }

    /// Return to the construction-time state
    ///
    /// Clears history and every selector cache, and (per
    /// [`StoreConfig::reset_unregisters_effects`]) stops all effects. Live
    /// subscribers are re-notified with the initial state when it differs
    /// from what they last saw. Requested from inside a notification, the
    /// reset is queued like a dispatch: commands submitted before it run
    /// first, commands submitted after it run against the initial state.
    pub fn reset(&self) -> Result<()> {
        self.inner.submit(Command::Reset)
    }

    /// Copy of the snapshot log, or `None` when history is disabled
    pub fn history(&self) -> Option<History<S>> {
        self.inner.history.lock().clone()
    }

    /// Actions applied so far in the current timeline
    pub fn actions(&self) -> Vec<ActionRef> {
        self.inner
            .history
            .lock()
            .as_ref()
            .map(History::actions)
            .unwrap_or_default()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.history.lock().as_ref().is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.inner.history.lock().as_ref().is_some_and(History::can_redo)
    }

    /// Snapshot the store currently shows
    pub fn current_snapshot(&self) -> Option<Snapshot<S>> {
        self.inner
            .history
            .lock()
            .as_ref()
            .map(|history| history.current().clone())
    }

    /// Show the state of snapshot `seq` without re-running reducers
    ///
    /// Like [`Store::dispatch`], a request made from inside a notification is
    /// queued behind the actions already pending.
    pub fn jump_to(&self, seq: u64) -> Result<()> {
        self.inner.submit(Command::Travel(Travel::JumpTo(seq)))
    }

    /// Step back one snapshot
    pub fn undo(&self) -> Result<()> {
        self.inner.submit(Command::Travel(Travel::Undo))
    }

    /// Step forward one snapshot
    pub fn redo(&self) -> Result<()> {
        self.inner.submit(Command::Travel(Travel::Redo))
    }
}
