//! The filter engine.
//!
//! Evaluation turns a source collection plus a selection into a display-ready
//! sequence in two stages:
//!
//! 1. **Filter**: with no filter selected every item passes. With one or more
//!    selected, an item passes if it satisfies at least one of them. Items
//!    without members (empty groups) never pass an active filter.
//! 2. **Sort**: survivors are ordered by the selected sort, or the default
//!    sort when none is selected, or left in source order when there is no
//!    default. The sort is stable.
//!
//! The output is a pure function of the source and the selection, and is
//! always recomputed from scratch.
//!
//! Like a proxy model, an [`EvaluationPlan`] first produces a row mapping
//! (the source row of each output row) and only then materializes items.
//!
//! Predicates and comparators run on worker threads and must not panic. A
//! panicking evaluation never delivers, and the owning table stays unsettled
//! until a newer evaluation replaces it.
//!
//! # Example
//!
//! ```
//! use quadrant::capability::Item;
//! use quadrant::engine::evaluate;
//! use quadrant::selection::{FilterMode, TableSelection};
//! use quadrant::table_function::{Filter, Sort, TableFunction};
//! use std::sync::Arc;
//!
//! struct Room(&'static str, bool);
//!
//! impl Item for Room {
//!     fn display_name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! let functions: Vec<TableFunction<Room>> = vec![Filter::new("Free", |r: &Room| r.1).into()];
//! let source = vec![Arc::new(Room("B", true)), Arc::new(Room("C", false)), Arc::new(Room("A", true))];
//! let by_name = Sort::new("A-Z", |a: &Room, b: &Room| a.0.cmp(b.0));
//!
//! let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
//! selection.toggle_filter(0).unwrap();
//!
//! let output = evaluate(&source, &functions, &selection, Some(&by_name));
//! let names: Vec<&str> = output.iter().map(|r| r.display_name()).collect();
//! assert_eq!(names, ["A", "B"]);
//! ```

use std::sync::Arc;

use quadrant_core::CancellationToken;
use quadrant_core::logging::{PerfSpan, span_names};

use crate::capability::Item;
use crate::selection::TableSelection;
use crate::table_function::{CompareFn, PredicateFn, Sort, TableFunction};

/// The resolved predicates and comparator for one evaluation.
///
/// Building a plan resolves deferred predicates and comparators, so state
/// such as the user's location is read once per evaluation. A plan is immutable and can
/// be moved to a worker thread.
pub struct EvaluationPlan<T: ?Sized> {
    filters: Vec<PredicateFn<T>>,
    compare: Option<CompareFn<T>>,
}

impl<T: Item + ?Sized> EvaluationPlan<T> {
    /// Resolve the plan for `selection` over `functions`.
    ///
    /// Selected indices that do not name a function of the right kind are
    /// ignored.
    pub fn new(
        functions: &[TableFunction<T>],
        selection: &TableSelection,
        default_sort: Option<&Sort<T>>,
    ) -> Self {
        let filters = selection
            .selected_filters()
            .filter_map(|index| functions.get(index)?.as_filter())
            .map(|filter| filter.predicate())
            .collect();

        let sort = selection
            .selected_sort()
            .and_then(|index| functions.get(index)?.as_sort())
            .or(default_sort);

        Self {
            filters,
            compare: sort.map(Sort::comparator),
        }
    }

    /// A plan that keeps every item in source order.
    pub fn identity() -> Self {
        Self {
            filters: Vec::new(),
            compare: None,
        }
    }

    /// Whether no filter is active.
    pub fn is_passthrough(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `item` survives the filter stage.
    pub fn passes(&self, item: &T) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        item.has_members() && self.filters.iter().any(|predicate| predicate(item))
    }

    /// Compute the row mapping: the source row of each output row.
    ///
    /// `token` is checked every `stride` rows during filtering and again
    /// around sorting. Returns `None` as soon as the token is cancelled.
    pub fn rows(
        &self,
        source: &[Arc<T>],
        token: &CancellationToken,
        stride: usize,
    ) -> Option<Vec<usize>> {
        let stride = stride.max(1);
        let mut rows = Vec::with_capacity(source.len());

        for (row, item) in source.iter().enumerate() {
            if row % stride == 0 && token.is_cancelled() {
                return None;
            }
            if self.passes(item) {
                rows.push(row);
            }
        }

        if let Some(compare) = &self.compare {
            if token.is_cancelled() {
                return None;
            }
            // `sort_by` is stable, and `rows` is in source order.
            rows.sort_by(|&a, &b| compare(&*source[a], &*source[b]));
        }

        if token.is_cancelled() {
            return None;
        }
        Some(rows)
    }

    /// Compute the output items.
    pub fn apply(
        &self,
        source: &[Arc<T>],
        token: &CancellationToken,
        stride: usize,
    ) -> Option<Vec<Arc<T>>> {
        let rows = self.rows(source, token, stride)?;
        Some(rows.into_iter().map(|row| source[row].clone()).collect())
    }
}

impl<T: ?Sized> Clone for EvaluationPlan<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for EvaluationPlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationPlan")
            .field("filters", &self.filters.len())
            .field("sorted", &self.compare.is_some())
            .finish()
    }
}

/// Evaluate `selection` against `source` synchronously.
pub fn evaluate<T: Item + ?Sized>(
    source: &[Arc<T>],
    functions: &[TableFunction<T>],
    selection: &TableSelection,
    default_sort: Option<&Sort<T>>,
) -> Vec<Arc<T>> {
    let _span = PerfSpan::new(span_names::EVALUATE);
    EvaluationPlan::new(functions, selection, default_sort)
        .apply(source, &CancellationToken::never(), usize::MAX)
        .unwrap_or_default()
}

/// Evaluate with cooperative cancellation.
///
/// Returns `None` if `token` was cancelled before the result was complete.
pub fn evaluate_cancellable<T: Item + ?Sized>(
    source: &[Arc<T>],
    functions: &[TableFunction<T>],
    selection: &TableSelection,
    default_sort: Option<&Sort<T>>,
    token: &CancellationToken,
    stride: usize,
) -> Option<Vec<Arc<T>>> {
    let _span = PerfSpan::new(span_names::EVALUATE);
    EvaluationPlan::new(functions, selection, default_sort).apply(source, token, stride)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FilterMode;
    use crate::table_function::Filter;
    use quadrant_core::GenerationCounter;

    #[derive(Debug)]
    struct Entry {
        name: &'static str,
        score: u32,
        open: bool,
    }

    impl Item for Entry {
        fn display_name(&self) -> &str {
            self.name
        }
    }

    fn entry(name: &'static str, score: u32, open: bool) -> Arc<Entry> {
        Arc::new(Entry { name, score, open })
    }

    fn names(items: &[Arc<Entry>]) -> Vec<&'static str> {
        items.iter().map(|e| e.name).collect()
    }

    fn functions() -> Vec<TableFunction<Entry>> {
        vec![
            Sort::new("Score", |a: &Entry, b: &Entry| a.score.cmp(&b.score)).into(),
            Filter::new("Open", |e: &Entry| e.open).into(),
            Filter::new("High", |e: &Entry| e.score >= 50).into(),
        ]
    }

    #[test]
    fn test_no_filter_passthrough() {
        let source = vec![entry("B", 2, false), entry("A", 1, true)];
        let functions = functions();
        let selection = TableSelection::for_functions(&functions, FilterMode::Multiple);

        assert_eq!(names(&evaluate(&source, &functions, &selection, None)), ["B", "A"]);
    }

    #[test]
    fn test_filters_are_unioned() {
        let source = vec![
            entry("open-low", 1, true),
            entry("closed-high", 90, false),
            entry("closed-low", 2, false),
        ];
        let functions = functions();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
        selection.set_selection(&[1, 2]).unwrap();

        let output = evaluate(&source, &functions, &selection, None);
        assert_eq!(names(&output), ["open-low", "closed-high"]);
    }

    #[test]
    fn test_selected_sort_overrides_default() {
        let source = vec![entry("C", 3, true), entry("A", 1, true), entry("B", 2, true)];
        let functions = functions();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
        let reverse = Sort::new("Reverse", |a: &Entry, b: &Entry| b.score.cmp(&a.score));

        assert_eq!(
            names(&evaluate(&source, &functions, &selection, Some(&reverse))),
            ["C", "B", "A"]
        );

        selection.select_sort(Some(0)).unwrap();
        assert_eq!(
            names(&evaluate(&source, &functions, &selection, Some(&reverse))),
            ["A", "B", "C"]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let source = vec![
            entry("first", 5, true),
            entry("low", 1, true),
            entry("second", 5, true),
            entry("third", 5, true),
        ];
        let functions = functions();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
        selection.select_sort(Some(0)).unwrap();

        let output = evaluate(&source, &functions, &selection, None);
        assert_eq!(names(&output), ["low", "first", "second", "third"]);
    }

    #[test]
    fn test_rows_map_to_source() {
        let source = vec![entry("x", 9, false), entry("y", 3, true), entry("z", 1, true)];
        let functions = functions();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
        selection.set_selection(&[0, 1]).unwrap();

        let plan = EvaluationPlan::new(&functions, &selection, None);
        let rows = plan.rows(&source, &CancellationToken::never(), 1).unwrap();
        assert_eq!(rows, vec![2, 1]);
    }

    #[test]
    fn test_cancelled_token_yields_none() {
        let source: Vec<_> = (0..100).map(|i| entry("n", i, true)).collect();
        let functions = functions();
        let selection = TableSelection::for_functions(&functions, FilterMode::Multiple);

        let counter = GenerationCounter::new();
        let token = counter.issue();
        counter.issue();

        assert!(evaluate_cancellable(&source, &functions, &selection, None, &token, 10).is_none());
    }

    #[test]
    fn test_empty_source() {
        let functions = functions();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
        selection.toggle_filter(1).unwrap();
        assert!(evaluate(&[], &functions, &selection, None).is_empty());
    }

    #[test]
    fn test_identity_plan() {
        let plan = EvaluationPlan::<Entry>::identity();
        assert!(plan.is_passthrough());
        let source = vec![entry("b", 1, false), entry("a", 0, false)];
        let output = plan.apply(&source, &CancellationToken::never(), 0).unwrap();
        assert_eq!(names(&output), ["b", "a"]);
    }
}
