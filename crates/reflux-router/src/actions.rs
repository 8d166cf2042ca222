//! Navigation actions
//!
//! One action per lifecycle callback of a navigation component. Each carries
//! the [`NavigationEvent`] the platform reported.

use indexmap::IndexMap;
use reflux_core::Action;
use serde::{Deserialize, Serialize};

/// How a navigation was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    #[default]
    New,
    Back,
    Forward,
    Refresh,
}

/// A navigation as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    /// Destination route
    pub path: String,
    /// Route parameters, in the order the platform supplied them
    pub params: IndexMap<String, String>,
    pub mode: NavigationMode,
}

impl NavigationEvent {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: IndexMap::new(),
            mode: NavigationMode::default(),
        }
    }

    /// Add a route parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// A navigation is starting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterNavigating {
    pub event: NavigationEvent,
}
impl Action for RouterNavigating {}

/// A navigation completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterNavigated {
    pub event: NavigationEvent,
}
impl Action for RouterNavigated {}

/// A navigation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterError {
    pub event: NavigationEvent,
    pub message: String,
}
impl Action for RouterError {}

/// A navigation was canceled before completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterCancel {
    pub event: NavigationEvent,
}
impl Action for RouterCancel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = NavigationEvent::new("/todos/3")
            .with_param("id", "3")
            .with_param("tab", "details")
            .with_mode(NavigationMode::Back);

        assert_eq!(event.param("id"), Some("3"));
        assert_eq!(event.param("missing"), None);
        assert_eq!(
            event.params.keys().collect::<Vec<_>>(),
            vec!["id", "tab"]
        );
        assert_eq!(event.mode, NavigationMode::Back);
    }
}
