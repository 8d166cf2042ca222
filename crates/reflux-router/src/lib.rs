//! Reflux Router - Navigation state for reflux stores
//!
//! A platform navigation component (window frame, browser history, TUI
//! screen stack) reports its lifecycle through a [`NavigationAdapter`].
//! The [`RouterBridge`] turns those callbacks into plain actions
//! ([`RouterNavigating`], [`RouterNavigated`], [`RouterError`],
//! [`RouterCancel`]) and dispatches them, and [`router_reducers`] folds them
//! into a [`RouterState`] held in the application state.
//!
//! # Example
//!
//! ```
//! use reflux_core::Store;
//! use reflux_router::{
//!     router_reducers, NavigationEvent, NavigationListener, RouterBridge, RouterState,
//! };
//!
//! let store = Store::new(router_reducers::<RouterState>(), RouterState::default());
//! let bridge = RouterBridge::new(&store);
//!
//! bridge.on_navigating(NavigationEvent::new("/todos")).unwrap();
//! bridge.on_navigated(NavigationEvent::new("/todos")).unwrap();
//! assert_eq!(store.state().current_path(), Some("/todos"));
//! ```

mod actions;
mod bridge;
mod error;
mod state;

pub use actions::{
    NavigationEvent, NavigationMode, RouterCancel, RouterError, RouterNavigated, RouterNavigating,
};
pub use bridge::{NavigationAdapter, NavigationListener, RouterBridge};
pub use error::{Error, Result};
pub use state::{router_reducers, select_current_path, HasRouter, RouterState};
