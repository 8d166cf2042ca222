//! Memoized selectors
//!
//! A [`Selector`] projects the store state to a derived value and remembers
//! the last `(state, value)` pair. Calling it again with the same state
//! allocation returns the cached value without running the projection.
//!
//! Combinators ([`Selector::combine2`], [`Selector::combine3`],
//! [`Selector::combine_all`]) build a selector over other selectors. Their
//! projection only runs when at least one input value changed, so a combined
//! view is evaluated once per state no matter how many inputs moved.
//!
//! Change notification (emit only when the output differs by value) lives in
//! [`Store::select`](crate::Store::select), not here.

use crate::{error::BoxError, Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SELECTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a selector, shared by all its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorId(pub u64);

impl SelectorId {
    fn next() -> Self {
        Self(NEXT_SELECTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything holding memoized values that must be dropped on reset or time travel
pub(crate) trait Memoized: Send + Sync {
    fn clear(&self);
}

/// Single-slot memo keyed on the input values of a combinator
struct ArgsMemo<A, R> {
    slot: Mutex<Option<(A, R)>>,
}

impl<A: PartialEq, R: Clone> ArgsMemo<A, R> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn get_or_compute(&self, args: A, compute: impl FnOnce(&A) -> R) -> R {
        if let Some((prev, result)) = &*self.slot.lock() {
            if *prev == args {
                return result.clone();
            }
        }
        let result = compute(&args);
        *self.slot.lock() = Some((args, result.clone()));
        result
    }
}

impl<A: Send, R: Send> Memoized for ArgsMemo<A, R> {
    fn clear(&self) {
        *self.slot.lock() = None;
    }
}

type Project<S, T> = Box<dyn Fn(&Arc<S>) -> Result<T> + Send + Sync>;

struct SelectorInner<S, T> {
    id: SelectorId,
    project: Project<S, T>,
    cache: Mutex<Option<(Arc<S>, T)>>,
    /// Input selectors and argument memos, cleared along with this one
    dependencies: Vec<Arc<dyn Memoized>>,
    recomputations: AtomicU64,
}

impl<S: Send + Sync, T: Send> Memoized for SelectorInner<S, T> {
    fn clear(&self) {
        *self.cache.lock() = None;
        for dependency in &self.dependencies {
            dependency.clear();
        }
    }
}

/// Memoized projection from state `S` to a derived value `T`
///
/// ```
/// use reflux_core::Selector;
/// use std::sync::Arc;
///
/// struct State { items: Vec<u32>, user: Option<String> }
///
/// let count = Selector::new(|s: &State| s.items.len());
/// let state = Arc::new(State { items: vec![1, 2], user: None });
///
/// assert_eq!(count.select(&state).unwrap(), 2);
/// assert_eq!(count.select(&state).unwrap(), 2);
/// assert_eq!(count.recomputations(), 1);
/// ```
pub struct Selector<S, T> {
    inner: Arc<SelectorInner<S, T>>,
}

impl<S, T> Clone for Selector<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, T> fmt::Debug for Selector<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("id", &self.inner.id)
            .field("inputs", &self.inner.dependencies.len())
            .finish()
    }
}

impl<S, T> Selector<S, T>
where
    S: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn build(id: SelectorId, project: Project<S, T>, dependencies: Vec<Arc<dyn Memoized>>) -> Self {
        Self {
            inner: Arc::new(SelectorInner {
                id,
                project,
                cache: Mutex::new(None),
                dependencies,
                recomputations: AtomicU64::new(0),
            }),
        }
    }

    /// Selector over a plain projection
    pub fn new<F>(project: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::build(
            SelectorId::next(),
            Box::new(move |state: &Arc<S>| Ok(project(state))),
            Vec::new(),
        )
    }

    /// Selector over a projection that may fail
    ///
    /// Failures reach only this selector's subscribers as [`Error::Selector`].
    pub fn try_new<F>(project: F) -> Self
    where
        F: Fn(&S) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        let id = SelectorId::next();
        Self::build(
            id,
            Box::new(move |state: &Arc<S>| {
                project(state).map_err(|source| Error::Selector { id, source })
            }),
            Vec::new(),
        )
    }

    pub fn id(&self) -> SelectorId {
        self.inner.id
    }

    /// How many times the projection actually ran
    pub fn recomputations(&self) -> u64 {
        self.inner.recomputations.load(Ordering::Relaxed)
    }

    /// Evaluate against `state`, reusing the cached value for the same state
    pub fn select(&self, state: &Arc<S>) -> Result<T> {
        if let Some((cached_state, value)) = &*self.inner.cache.lock() {
            if Arc::ptr_eq(cached_state, state) {
                return Ok(value.clone());
            }
        }

        self.inner.recomputations.fetch_add(1, Ordering::Relaxed);
        let value = (self.inner.project)(state)?;
        *self.inner.cache.lock() = Some((Arc::clone(state), value.clone()));
        Ok(value)
    }

    /// Forget the cached value (and those of every input)
    pub fn clear_cache(&self) {
        self.inner.clear();
    }

    pub(crate) fn memo(&self) -> Arc<dyn Memoized> {
        self.inner.clone()
    }

    /// Derive a new selector from this one's output
    pub fn map<U, F>(&self, f: F) -> Selector<S, U>
    where
        T: PartialEq,
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let memo = Arc::new(ArgsMemo::<T, U>::new());
        let (input, args) = (self.clone(), Arc::clone(&memo));
        Selector::build(
            SelectorId::next(),
            Box::new(move |state: &Arc<S>| {
                let value = input.select(state)?;
                Ok(args.get_or_compute(value, |v| f(v)))
            }),
            vec![self.memo(), memo as Arc<dyn Memoized>],
        )
    }

    /// Combine two selectors
    pub fn combine2<A, B, F>(a: &Selector<S, A>, b: &Selector<S, B>, f: F) -> Self
    where
        A: Clone + PartialEq + Send + Sync + 'static,
        B: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&A, &B) -> T + Send + Sync + 'static,
    {
        let memo = Arc::new(ArgsMemo::<(A, B), T>::new());
        let (sa, sb, args) = (a.clone(), b.clone(), Arc::clone(&memo));
        Self::build(
            SelectorId::next(),
            Box::new(move |state: &Arc<S>| {
                let inputs = (sa.select(state)?, sb.select(state)?);
                Ok(args.get_or_compute(inputs, |(a, b)| f(a, b)))
            }),
            vec![a.memo(), b.memo(), memo as Arc<dyn Memoized>],
        )
    }

    /// Combine three selectors
    pub fn combine3<A, B, C, F>(
        a: &Selector<S, A>,
        b: &Selector<S, B>,
        c: &Selector<S, C>,
        f: F,
    ) -> Self
    where
        A: Clone + PartialEq + Send + Sync + 'static,
        B: Clone + PartialEq + Send + Sync + 'static,
        C: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&A, &B, &C) -> T + Send + Sync + 'static,
    {
        let memo = Arc::new(ArgsMemo::<(A, B, C), T>::new());
        let (sa, sb, sc, args) = (a.clone(), b.clone(), c.clone(), Arc::clone(&memo));
        Self::build(
            SelectorId::next(),
            Box::new(move |state: &Arc<S>| {
                let inputs = (sa.select(state)?, sb.select(state)?, sc.select(state)?);
                Ok(args.get_or_compute(inputs, |(a, b, c)| f(a, b, c)))
            }),
            vec![a.memo(), b.memo(), c.memo(), memo as Arc<dyn Memoized>],
        )
    }

    /// Combine any number of selectors sharing an output type
    pub fn combine_all<A, F>(inputs: Vec<Selector<S, A>>, f: F) -> Self
    where
        A: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&[A]) -> T + Send + Sync + 'static,
    {
        let memo = Arc::new(ArgsMemo::<Vec<A>, T>::new());
        let mut dependencies: Vec<Arc<dyn Memoized>> =
            inputs.iter().map(|input| input.memo()).collect();
        dependencies.push(memo.clone());

        let args = Arc::clone(&memo);
        Self::build(
            SelectorId::next(),
            Box::new(move |state: &Arc<S>| {
                let values = inputs
                    .iter()
                    .map(|input| input.select(state))
                    .collect::<Result<Vec<A>>>()?;
                Ok(args.get_or_compute(values, |values| f(values)))
            }),
            dependencies,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct State {
        items: Vec<u32>,
        user: Option<String>,
    }

    fn state(items: Vec<u32>, user: Option<&str>) -> Arc<State> {
        Arc::new(State {
            items,
            user: user.map(String::from),
        })
    }

    #[test]
    fn test_cache_hit_on_same_state() {
        let selector = Selector::new(|s: &State| s.items.len());
        let s = state(vec![1], None);
        assert_eq!(selector.select(&s).unwrap(), 1);
        assert_eq!(selector.select(&s).unwrap(), 1);
        assert_eq!(selector.recomputations(), 1);

        // A new allocation recomputes, even with equal contents
        let s2 = state(vec![1], None);
        assert_eq!(selector.select(&s2).unwrap(), 1);
        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn test_clear_cache() {
        let selector = Selector::new(|s: &State| s.user.clone());
        let s = state(vec![], Some("Emily"));
        selector.select(&s).unwrap();
        selector.clear_cache();
        selector.select(&s).unwrap();
        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn test_clones_share_identity_and_cache() {
        let a = Selector::new(|s: &State| s.items.clone());
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        let s = state(vec![3], None);
        a.select(&s).unwrap();
        b.select(&s).unwrap();
        assert_eq!(a.recomputations(), 1);
        assert_ne!(a.id(), Selector::new(|s: &State| s.items.len()).id());
    }

    #[test]
    fn test_combine2_skips_projection_when_inputs_equal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let items = Selector::new(|s: &State| s.items.clone());
        let user = Selector::new(|s: &State| s.user.clone());
        let counter = Arc::clone(&calls);
        let summary = Selector::combine2(&items, &user, move |items, user| {
            counter.fetch_add(1, Ordering::SeqCst);
            format!("{}:{}", items.len(), user.as_deref().unwrap_or("-"))
        });

        assert_eq!(summary.select(&state(vec![1], None)).unwrap(), "1:-");
        // New state, same input values
        assert_eq!(summary.select(&state(vec![1], None)).unwrap(), "1:-");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(summary.select(&state(vec![1, 2], Some("Emily"))).unwrap(), "2:Emily");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_combine3_and_all() {
        let first = Selector::new(|s: &State| s.items.first().copied().unwrap_or(0));
        let last = Selector::new(|s: &State| s.items.last().copied().unwrap_or(0));
        let len = Selector::new(|s: &State| s.items.len() as u32);
        let s = state(vec![4, 5, 6], None);

        let triple = Selector::combine3(&first, &last, &len, |a, b, c| a + b + c);
        assert_eq!(triple.select(&s).unwrap(), 13);

        let total = Selector::combine_all(vec![first, last, len], |values| values.iter().sum::<u32>());
        assert_eq!(total.select(&s).unwrap(), 13);
    }

    #[test]
    fn test_map() {
        let items = Selector::new(|s: &State| s.items.clone());
        let doubled = items.map(|items| items.iter().map(|i| i * 2).collect::<Vec<_>>());
        assert_eq!(doubled.select(&state(vec![1, 2], None)).unwrap(), vec![2, 4]);
    }

    #[test]
    fn test_failing_projection() {
        let selector = Selector::try_new(|s: &State| {
            s.user.clone().ok_or_else(|| BoxError::from("no user"))
        });
        let err = selector.select(&state(vec![], None)).unwrap_err();
        assert!(matches!(err, Error::Selector { id, .. } if id == selector.id()));
        assert_eq!(
            selector.select(&state(vec![], Some("Emily"))).unwrap(),
            "Emily"
        );

        // Input failures propagate through combinators untouched
        let len = Selector::new(|s: &State| s.items.len());
        let combined = Selector::combine2(&selector, &len, |u, n| format!("{u}{n}"));
        let err = combined.select(&state(vec![], None)).unwrap_err();
        assert!(matches!(err, Error::Selector { id, .. } if id == selector.id()));
    }
}
