//! Reducer registry
//!
//! A [`Reducers`] value is an ordered list of partial reducers, each keyed by
//! the action type it handles. Applying an action folds it through every
//! matching reducer in registration order; an action nobody handles leaves
//! the state untouched.

use crate::{error::BoxError, Action, Error, Result};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

type ReduceFn<S> =
    Arc<dyn Fn(&S, &dyn Action) -> std::result::Result<S, BoxError> + Send + Sync>;

/// A single partial reducer
struct On<S> {
    action_type: TypeId,
    tag: &'static str,
    reduce: ReduceFn<S>,
}

impl<S> Clone for On<S> {
    fn clone(&self) -> Self {
        Self {
            action_type: self.action_type,
            tag: self.tag,
            reduce: Arc::clone(&self.reduce),
        }
    }
}

/// Composed reducer built from independently registered partial reducers
///
/// ```
/// use reflux_core::{Action, Reducers};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Increment;
/// impl Action for Increment {}
///
/// let reducers = Reducers::new().on(|count: &u32, _: &Increment| count + 1);
/// let next = reducers.apply(&Arc::new(1u32), &Increment).unwrap();
/// assert_eq!(*next, 2);
/// ```
pub struct Reducers<S> {
    entries: Vec<On<S>>,
}

impl<S: 'static> Reducers<S> {
    /// Create an empty registry (the identity reducer)
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a reducer for actions of type `A`
    pub fn on<A, F>(self, reduce: F) -> Self
    where
        A: Action,
        F: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        self.try_on(move |state: &S, action: &A| Ok(reduce(state, action)))
    }

    /// Register a fallible reducer for actions of type `A`
    ///
    /// An error aborts the dispatch and is returned to its caller.
    pub fn try_on<A, F>(mut self, reduce: F) -> Self
    where
        A: Action,
        F: Fn(&S, &A) -> std::result::Result<S, BoxError> + Send + Sync + 'static,
    {
        let reduce: ReduceFn<S> = Arc::new(move |state: &S, action: &dyn Action| {
            match action.downcast_ref::<A>() {
                Some(action) => reduce(state, action),
                None => Err(format!("expected {}", crate::action_tag::<A>()).into()),
            }
        });
        self.entries.push(On {
            action_type: TypeId::of::<A>(),
            tag: crate::action_tag::<A>(),
            reduce,
        });
        self
    }

    /// Append every reducer of `other` after the ones already registered
    pub fn merge(mut self, other: Reducers<S>) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Number of partial reducers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any reducer handles actions of type `A`
    pub fn handles<A: Action>(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.action_type == TypeId::of::<A>())
    }

    /// Fold `action` through every matching reducer in registration order
    ///
    /// Returns the input `Arc` unchanged when no reducer matched.
    pub fn apply(&self, state: &Arc<S>, action: &dyn Action) -> Result<Arc<S>> {
        let action_type = action.as_any().type_id();
        let mut current = Arc::clone(state);
        for entry in self.entries.iter().filter(|e| e.action_type == action_type) {
            let next = (entry.reduce)(&current, action).map_err(|source| Error::Reducer {
                tag: action.tag(),
                source,
            })?;
            current = Arc::new(next);
        }
        Ok(current)
    }
}

impl<S: 'static> Default for Reducers<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Reducers<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S> fmt::Debug for Reducers<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.tag))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Add(i64);
    impl Action for Add {}

    #[derive(Debug)]
    struct Double;
    impl Action for Double {}

    #[derive(Debug)]
    struct Unknown;
    impl Action for Unknown {}

    fn reducers() -> Reducers<i64> {
        Reducers::new()
            .on(|n: &i64, a: &Add| n + a.0)
            .on(|n: &i64, _: &Double| n * 2)
    }

    #[test]
    fn test_unmatched_action_is_identity() {
        let state = Arc::new(5);
        let next = reducers().apply(&state, &Unknown).unwrap();
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_fold_in_registration_order() {
        // Both reducers handle Add: the second sees the first one's output
        let reducers = Reducers::new()
            .on(|n: &i64, a: &Add| n + a.0)
            .on(|n: &i64, _: &Add| n * 10);
        let next = reducers.apply(&Arc::new(1), &Add(2)).unwrap();
        assert_eq!(*next, 30);
    }

    #[test]
    fn test_merge_appends() {
        let extra = Reducers::new().on(|n: &i64, _: &Double| n + 1);
        let merged = reducers().merge(extra);
        assert_eq!(merged.len(), 3);
        assert_eq!(*merged.apply(&Arc::new(3), &Double).unwrap(), 7);
        assert!(merged.handles::<Add>());
        assert!(!merged.handles::<Unknown>());
    }

    #[test]
    fn test_failing_reducer() {
        let reducers = Reducers::new().try_on(|n: &i64, a: &Add| {
            n.checked_add(a.0).ok_or_else(|| "overflow".into())
        });
        let err = reducers.apply(&Arc::new(i64::MAX), &Add(1)).unwrap_err();
        match err {
            Error::Reducer { tag, source } => {
                assert_eq!(tag, crate::action_tag::<Add>());
                assert_eq!(source.to_string(), "overflow");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
