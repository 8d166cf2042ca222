//! Action types for the store
//!
//! Actions are plain immutable data. The store never inspects them beyond
//! their runtime type: reducers and `observe::<A>()` match on the concrete
//! type, and [`Action::tag`] names it for logs and devtools.

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;

/// Type-erasure helpers shared by every [`Action`]
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Marker trait for values that can be dispatched to a [`Store`](crate::Store)
///
/// ```
/// use reflux_core::Action;
///
/// #[derive(Debug)]
/// struct SwitchUser {
///     name: String,
/// }
///
/// impl Action for SwitchUser {}
///
/// let action = SwitchUser { name: "Emily".into() };
/// assert!(action.tag().ends_with("SwitchUser"));
/// ```
pub trait Action: AsAny + Debug {
    /// Name of the action kind, used for logging and devtools output
    fn tag(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A dispatched action as it travels through the store
pub type ActionRef = Arc<dyn Action>;

impl dyn Action {
    /// Check whether this action is of type `A`
    pub fn is<A: Action>(&self) -> bool {
        self.as_any().type_id() == TypeId::of::<A>()
    }

    /// Borrow this action as `A` if it is one
    pub fn downcast_ref<A: Action>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }
}

/// Recover the concrete action type from a shared action, without cloning
pub fn downcast_action<A: Action>(action: ActionRef) -> Option<Arc<A>> {
    action.into_any_arc().downcast::<A>().ok()
}

/// The tag every action of type `A` reports
pub fn action_tag<A: Action>() -> &'static str {
    std::any::type_name::<A>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);
    impl Action for Ping {}

    #[derive(Debug)]
    struct Pong;
    impl Action for Pong {
        fn tag(&self) -> &'static str {
            "pong"
        }
    }

    #[test]
    fn test_downcast_ref() {
        let action: ActionRef = Arc::new(Ping(7));
        assert!(action.is::<Ping>());
        assert!(!action.is::<Pong>());
        assert_eq!(action.downcast_ref::<Ping>(), Some(&Ping(7)));
        assert!(action.downcast_ref::<Pong>().is_none());
    }

    #[test]
    fn test_downcast_action_keeps_allocation() {
        let action: ActionRef = Arc::new(Ping(1));
        let typed = downcast_action::<Ping>(action.clone()).unwrap();
        assert_eq!(*typed, Ping(1));
        assert!(downcast_action::<Pong>(action).is_none());
    }

    #[test]
    fn test_tags() {
        let ping: ActionRef = Arc::new(Ping(0));
        assert_eq!(ping.tag(), action_tag::<Ping>());
        let pong: ActionRef = Arc::new(Pong);
        assert_eq!(pong.tag(), "pong");
    }
}
