//! Reflux Devtools - Inspect and export a store's history
//!
//! This crate builds on the snapshot log kept by `reflux-core` stores:
//!
//! - **Inspector**: list recorded actions, step backward/forward, jump to a snapshot
//! - **Exporter**: write the log out as RON, JSON, CSV or plain text
//!
//! # Example
//!
//! ```
//! use reflux_core::{Action, Reducers, Store};
//! use reflux_devtools::{ExportFormat, Exporter, Inspector};
//!
//! #[derive(Debug)]
//! struct Increment;
//! impl Action for Increment {}
//!
//! let store = Store::new(Reducers::new().on(|n: &u32, _: &Increment| n + 1), 0u32);
//! for _ in 0..3 {
//!     store.dispatch(Increment).unwrap();
//! }
//!
//! let mut inspector = Inspector::new(store.clone()).unwrap();
//! inspector.step_backward().unwrap();
//! assert_eq!(*store.state(), 2);
//!
//! let history = inspector.history();
//! let text = Exporter::new(&history).export(ExportFormat::Text).unwrap();
//! assert!(text.contains("Increment"));
//! ```

mod error;
mod exporter;
mod inspector;

pub use error::{Error, Result};
pub use exporter::{ExportFormat, Exporter};
pub use inspector::{Entry, Inspector};

// Re-export core history types for convenience
pub use reflux_core::{History, HistoryStats, Snapshot};
