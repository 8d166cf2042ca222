//! Router state and its reducers

use crate::{NavigationEvent, RouterCancel, RouterError, RouterNavigated, RouterNavigating};
use reflux_core::{Reducers, Selector};
use serde::{Deserialize, Serialize};

/// Navigation slice of an application state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouterState {
    /// Last completed navigation
    pub current: Option<NavigationEvent>,
    /// The navigation `current` replaced
    pub previous: Option<NavigationEvent>,
    /// Navigation started but not yet completed, failed or canceled
    pub pending: Option<NavigationEvent>,
    /// Message of the last failed navigation, cleared by the next success
    pub last_error: Option<String>,
}

impl RouterState {
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_ref().map(|event| event.path.as_str())
    }

    pub fn is_navigating(&self) -> bool {
        self.pending.is_some()
    }
}

/// Application states that embed a [`RouterState`]
pub trait HasRouter: Clone + Send + Sync + 'static {
    fn router(&self) -> &RouterState;

    /// Copy of `self` with the router slice replaced
    fn with_router(&self, router: RouterState) -> Self;
}

impl HasRouter for RouterState {
    fn router(&self) -> &RouterState {
        self
    }

    fn with_router(&self, router: RouterState) -> Self {
        router
    }
}

/// Reducers for the four navigation actions
///
/// Merge them into the application's own set with [`Reducers::merge`].
pub fn router_reducers<S: HasRouter>() -> Reducers<S> {
    Reducers::new()
        .on(|state: &S, action: &RouterNavigating| {
            state.with_router(RouterState {
                pending: Some(action.event.clone()),
                ..state.router().clone()
            })
        })
        .on(|state: &S, action: &RouterNavigated| {
            let router = state.router();
            state.with_router(RouterState {
                previous: router.current.clone(),
                current: Some(action.event.clone()),
                pending: None,
                last_error: None,
            })
        })
        .on(|state: &S, action: &RouterError| {
            state.with_router(RouterState {
                pending: None,
                last_error: Some(action.message.clone()),
                ..state.router().clone()
            })
        })
        .on(|state: &S, _: &RouterCancel| {
            state.with_router(RouterState {
                pending: None,
                ..state.router().clone()
            })
        })
}

/// Path of the last completed navigation
pub fn select_current_path<S: HasRouter>() -> Selector<S, Option<String>> {
    Selector::new(|state: &S| state.router().current_path().map(str::to_string))
}
