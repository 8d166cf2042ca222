//! Reflux Core - Unidirectional state store
//!
//! This crate provides the store engine:
//! - Actions as plain typed data (`Action`, `ActionRef`)
//! - Composable partial reducers (`Reducers`)
//! - A synchronous multicast action stream (`Subject`, `Observable`)
//! - Memoized, composable selectors (`Selector`)
//! - Named effects that react to actions and may dispatch more (`Effect`)
//! - Snapshot history with undo, redo and jump-to (`History`)
//!
//! ## Example
//!
//! ```
//! use reflux_core::{Action, Reducers, Selector, Store};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, PartialEq, Default)]
//! struct Todos {
//!     items: Vec<String>,
//!     user: Option<String>,
//! }
//!
//! #[derive(Debug)]
//! struct AddTodo(String);
//! impl Action for AddTodo {}
//!
//! let store = Store::new(
//!     Reducers::new().on(|s: &Todos, a: &AddTodo| {
//!         let mut items = s.items.clone();
//!         items.push(a.0.clone());
//!         Todos { items, ..s.clone() }
//!     }),
//!     Todos::default(),
//! );
//!
//! let count = Selector::new(|s: &Todos| s.items.len());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let _subscription = store.select(&count).subscribe(move |n| sink.lock().push(n));
//!
//! store.dispatch(AddTodo("write docs".into())).unwrap();
//! assert_eq!(*seen.lock(), vec![0, 1]);
//! ```

mod action;
mod config;
pub mod effect;
mod error;
pub mod history;
pub mod observable;
mod reducer;
pub mod selector;
mod store;

pub use action::{action_tag, downcast_action, Action, ActionRef, AsAny};
pub use config::StoreConfig;
pub use effect::Effect;
pub use error::{BoxError, Error, Result};
pub use history::{History, HistoryStats, Snapshot};
pub use observable::{Observable, Observer, Subject, Subscription};
pub use reducer::Reducers;
pub use selector::{Selector, SelectorId};
pub use store::{Store, StoreState, WeakStore};
