//! Filters and sorts that can be attached to a displayed collection.
//!
//! A [`TableFunction`] is either a named [`Filter`] (a predicate; any number
//! may be active) or a named [`Sort`] (a comparator; at most one is active).
//! Table functions are built once when a table is set up and never change
//! afterwards. Which ones are active is tracked separately by
//! [`TableSelection`](crate::selection::TableSelection).

use std::cmp::Ordering;
use std::sync::Arc;

/// Type alias for a filter predicate.
///
/// Returns `true` if the item should be included.
pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Type alias for a sort comparator.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Type alias for a function that produces a comparator on demand.
///
/// Used by sorts that depend on external state, such as the user's current
/// location. The factory runs once per evaluation so every comparison within
/// one sort sees the same state.
pub type ComparatorFactory<T> = Arc<dyn Fn() -> CompareFn<T> + Send + Sync>;

/// Type alias for a function that produces a predicate on demand.
///
/// The filter counterpart of [`ComparatorFactory`]: the factory runs once per
/// evaluation and every item is tested against the same state.
pub type PredicateFactory<T> = Arc<dyn Fn() -> PredicateFn<T> + Send + Sync>;

enum Predicate<T: ?Sized> {
    Fixed(PredicateFn<T>),
    Deferred(PredicateFactory<T>),
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(predicate) => Self::Fixed(predicate.clone()),
            Self::Deferred(factory) => Self::Deferred(factory.clone()),
        }
    }
}

/// A named, toggleable predicate.
pub struct Filter<T: ?Sized> {
    label: String,
    predicate: Predicate<T>,
}

impl<T: ?Sized> Filter<T> {
    /// Create a filter.
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Predicate::Fixed(Arc::new(predicate)),
        }
    }

    /// Create a filter whose predicate is built fresh for every evaluation.
    ///
    /// ```
    /// use quadrant::table_function::{Filter, PredicateFn};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// let limit = Arc::new(AtomicU32::new(10));
    /// let limit_for_filter = limit.clone();
    /// let below: Filter<u32> = Filter::deferred("Below limit", move || {
    ///     let max = limit_for_filter.load(Ordering::SeqCst);
    ///     let predicate: PredicateFn<u32> = Arc::new(move |n: &u32| *n < max);
    ///     predicate
    /// });
    ///
    /// let resolved = below.predicate();
    /// limit.store(0, Ordering::SeqCst);
    /// assert!(resolved(&5));
    /// assert!(!below.matches(&5));
    /// ```
    pub fn deferred<F>(label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> PredicateFn<T> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Predicate::Deferred(Arc::new(factory)),
        }
    }

    /// The label shown on the filter's button.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether `item` satisfies this filter.
    ///
    /// A deferred filter is resolved on every call; to test many items
    /// against one state, resolve once with [`predicate`](Self::predicate).
    pub fn matches(&self, item: &T) -> bool {
        (self.predicate())(item)
    }

    /// Resolve the predicate for one evaluation.
    pub fn predicate(&self) -> PredicateFn<T> {
        match &self.predicate {
            Predicate::Fixed(predicate) => predicate.clone(),
            Predicate::Deferred(factory) => factory(),
        }
    }
}

impl<T: ?Sized> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deferred = matches!(self.predicate, Predicate::Deferred(_));
        f.debug_struct("Filter")
            .field("label", &self.label)
            .field("deferred", &deferred)
            .finish()
    }
}

enum Comparator<T: ?Sized> {
    Fixed(CompareFn<T>),
    Deferred(ComparatorFactory<T>),
}

impl<T: ?Sized> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(compare) => Self::Fixed(compare.clone()),
            Self::Deferred(factory) => Self::Deferred(factory.clone()),
        }
    }
}

/// A named comparator. Sorts are mutually exclusive.
pub struct Sort<T: ?Sized> {
    label: String,
    comparator: Comparator<T>,
}

impl<T: ?Sized> Sort<T> {
    /// Create a sort from a comparator.
    pub fn new<F>(label: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            comparator: Comparator::Fixed(Arc::new(compare)),
        }
    }

    /// Create a sort whose comparator is built fresh for every evaluation.
    ///
    /// ```
    /// use quadrant::table_function::{CompareFn, Sort};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI64, Ordering};
    ///
    /// let pivot = Arc::new(AtomicI64::new(10));
    /// let pivot_for_sort = pivot.clone();
    /// let closest: Sort<i64> = Sort::deferred("Closest", move || {
    ///     let p = pivot_for_sort.load(Ordering::SeqCst);
    ///     let compare: CompareFn<i64> = Arc::new(move |a: &i64, b: &i64| {
    ///         (a - p).abs().cmp(&(b - p).abs())
    ///     });
    ///     compare
    /// });
    ///
    /// let compare = closest.comparator();
    /// assert!(compare(&9, &20).is_lt());
    /// ```
    pub fn deferred<F>(label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> CompareFn<T> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            comparator: Comparator::Deferred(Arc::new(factory)),
        }
    }

    /// The label shown on the sort's button.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolve the comparator for one evaluation.
    pub fn comparator(&self) -> CompareFn<T> {
        match &self.comparator {
            Comparator::Fixed(compare) => compare.clone(),
            Comparator::Deferred(factory) => factory(),
        }
    }
}

impl<T: ?Sized> Clone for Sort<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Sort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deferred = matches!(self.comparator, Comparator::Deferred(_));
        f.debug_struct("Sort")
            .field("label", &self.label)
            .field("deferred", &deferred)
            .finish()
    }
}

/// Whether a table function is a filter or a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Multi-select predicate.
    Filter,
    /// Exclusive comparator.
    Sort,
}

/// A filter or a sort attached to a table.
pub enum TableFunction<T: ?Sized> {
    /// A predicate.
    Filter(Filter<T>),
    /// A comparator.
    Sort(Sort<T>),
}

impl<T: ?Sized> TableFunction<T> {
    /// The function's label.
    pub fn label(&self) -> &str {
        match self {
            Self::Filter(filter) => filter.label(),
            Self::Sort(sort) => sort.label(),
        }
    }

    /// Whether this is a filter or a sort.
    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Filter(_) => FunctionKind::Filter,
            Self::Sort(_) => FunctionKind::Sort,
        }
    }

    /// The filter, if this is one.
    pub fn as_filter(&self) -> Option<&Filter<T>> {
        match self {
            Self::Filter(filter) => Some(filter),
            Self::Sort(_) => None,
        }
    }

    /// The sort, if this is one.
    pub fn as_sort(&self) -> Option<&Sort<T>> {
        match self {
            Self::Filter(_) => None,
            Self::Sort(sort) => Some(sort),
        }
    }
}

impl<T: ?Sized> Clone for TableFunction<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Filter(filter) => Self::Filter(filter.clone()),
            Self::Sort(sort) => Self::Sort(sort.clone()),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for TableFunction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter(filter) => filter.fmt(f),
            Self::Sort(sort) => sort.fmt(f),
        }
    }
}

impl<T: ?Sized> From<Filter<T>> for TableFunction<T> {
    fn from(filter: Filter<T>) -> Self {
        Self::Filter(filter)
    }
}

impl<T: ?Sized> From<Sort<T>> for TableFunction<T> {
    fn from(sort: Sort<T>) -> Self {
        Self::Sort(sort)
    }
}
