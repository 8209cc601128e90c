//! Filter tables.
//!
//! A [`FilterTable`] owns a list of table functions, the current selection,
//! the unfiltered source collection and the last applied output. Every
//! change to the selection or the source issues a new evaluation:
//!
//! 1. On the main context, the selection and source are snapshotted and the
//!    plan is resolved (deferred sorts read their state here).
//! 2. The plan runs on the worker pool, checking its generation token every
//!    `checkpoint_stride` rows.
//! 3. The result comes back to the main context and is applied only if no
//!    newer evaluation has been issued and the table still exists. Consumers
//!    are then notified through [`FilterTable::output_changed`].
//!
//! Selection state may only be changed from the thread that owns the
//! [`MainContext`] the table was built with.
//!
//! # Example
//!
//! ```
//! use quadrant::capability::Item;
//! use quadrant::filter_table::FilterTable;
//! use quadrant::items::Resource;
//! use quadrant::sorting;
//! use quadrant_core::{MainContext, ThreadPool, ThreadPoolConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let context = MainContext::new();
//! let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap());
//!
//! let table = FilterTable::builder(vec![sorting::open_now::<Resource>().into()])
//!     .default_sort(sorting::alphabetical())
//!     .source(vec![Arc::new(Resource::new("Tang Center")), Arc::new(Resource::new("Basic Needs Center"))])
//!     .pool(pool)
//!     .build(&context)
//!     .unwrap();
//!
//! context.process_until(Duration::from_secs(2), || table.is_settled());
//! assert_eq!(table.item(0).unwrap().display_name(), "Basic Needs Center");
//! assert!(table.item(2).is_none());
//! ```

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use quadrant_core::logging::{PerfSpan, span_names, targets};
use quadrant_core::{MainContext, Recomputer, Signal, ThreadAffinity, ThreadPool};

use crate::capability::Item;
use crate::config::{DEFAULT_CHECKPOINT_STRIDE, QuadrantConfig};
use crate::engine::EvaluationPlan;
use crate::error::Result;
use crate::selection::{FilterMode, TableSelection};
use crate::table_function::{Sort, TableFunction};

/// The output currently shown, with its row mapping.
struct Displayed<T: ?Sized> {
    /// Source row of each output row.
    mapping: Vec<usize>,
    items: Vec<Arc<T>>,
    generation: u64,
}

impl<T: ?Sized> Displayed<T> {
    fn empty() -> Self {
        Self {
            mapping: Vec::new(),
            items: Vec::new(),
            generation: 0,
        }
    }
}

struct TableState<T: ?Sized> {
    functions: Vec<TableFunction<T>>,
    default_sort: Option<Sort<T>>,
    selection: Mutex<TableSelection>,
    source: RwLock<Arc<Vec<Arc<T>>>>,
    displayed: RwLock<Displayed<T>>,
    recomputer: Recomputer,
    checkpoint_stride: usize,
    affinity: ThreadAffinity,
    output_changed: Signal<usize>,
}

impl<T: Item + ?Sized + 'static> TableState<T> {
    fn apply(&self, displayed: Displayed<T>) {
        let rows = displayed.items.len();
        let generation = displayed.generation;
        *self.displayed.write() = displayed;

        tracing::debug!(target: targets::FILTER_TABLE, generation, rows, "output applied");
        self.output_changed.emit(rows);
    }
}

/// A filtered, sorted view over a source collection.
pub struct FilterTable<T: Item + ?Sized + 'static> {
    state: Arc<TableState<T>>,
}

impl<T: Item + ?Sized + 'static> FilterTable<T> {
    /// Start building a table over `functions`.
    pub fn builder(functions: Vec<TableFunction<T>>) -> FilterTableBuilder<T> {
        FilterTableBuilder::new(functions)
    }

    /// The table functions, in display order.
    pub fn functions(&self) -> &[TableFunction<T>] {
        &self.state.functions
    }

    /// A copy of the current selection.
    pub fn selection(&self) -> TableSelection {
        self.state.selection.lock().clone()
    }

    /// Flip the filter at `index` and re-evaluate.
    ///
    /// Returns whether the filter is now selected.
    pub fn toggle_filter(&self, index: usize) -> Result<bool> {
        self.state.affinity.debug_assert_same_thread();
        let selected = self.state.selection.lock().toggle_filter(index)?;
        self.update();
        Ok(selected)
    }

    /// Select the sort at `index` exclusively (or the default sort with
    /// `None`) and re-evaluate.
    pub fn select_sort(&self, index: Option<usize>) -> Result<()> {
        self.state.affinity.debug_assert_same_thread();
        self.state.selection.lock().select_sort(index)?;
        self.update();
        Ok(())
    }

    /// Replace the whole selection and re-evaluate.
    ///
    /// On error the selection is unchanged and nothing is re-evaluated.
    pub fn set_selection(&self, indices: &[usize]) -> Result<()> {
        self.state.affinity.debug_assert_same_thread();
        self.state.selection.lock().set_selection(indices)?;
        self.update();
        Ok(())
    }

    /// Replace the source collection and re-evaluate.
    pub fn set_data(&self, items: Vec<Arc<T>>) {
        self.state.affinity.debug_assert_same_thread();
        *self.state.source.write() = Arc::new(items);
        self.update();
    }

    /// The current source collection.
    pub fn source(&self) -> Arc<Vec<Arc<T>>> {
        self.state.source.read().clone()
    }

    /// Issue a new evaluation of the current source and selection.
    ///
    /// Any evaluation still in flight is superseded and its result will be
    /// discarded.
    pub fn update(&self) {
        let state = &self.state;
        state.affinity.debug_assert_same_thread();

        let source = state.source.read().clone();
        let selection = state.selection.lock().clone();
        let plan = EvaluationPlan::new(&state.functions, &selection, state.default_sort.as_ref());
        let stride = state.checkpoint_stride;
        let rows = source.len();
        let owner: Weak<TableState<T>> = Arc::downgrade(&self.state);

        let token = state.recomputer.submit(
            move |token| {
                let _span = PerfSpan::new(span_names::EVALUATE);
                let mapping = plan.rows(&source, token, stride)?;
                let items = mapping.iter().map(|&row| source[row].clone()).collect();
                Some(Displayed {
                    mapping,
                    items,
                    generation: token.generation(),
                })
            },
            move |displayed| match owner.upgrade() {
                Some(state) => state.apply(displayed),
                None => {
                    tracing::debug!(
                        target: targets::FILTER_TABLE,
                        "table dropped before evaluation finished"
                    );
                }
            },
        );

        tracing::debug!(
            target: targets::FILTER_TABLE,
            generation = token.generation(),
            rows,
            filters = selection.selected_filter_count(),
            sort = ?selection.selected_sort(),
            "evaluation requested"
        );
    }

    /// Supersede any in-flight evaluation without issuing a new one.
    pub fn cancel_pending(&self) {
        self.state.recomputer.cancel();
    }

    /// Whether the latest evaluation has come back to the main context.
    pub fn is_settled(&self) -> bool {
        self.state.recomputer.is_idle()
    }

    /// The filtered, sorted output last applied.
    pub fn filtered_output(&self) -> Vec<Arc<T>> {
        self.state.displayed.read().items.clone()
    }

    /// Number of output rows.
    pub fn row_count(&self) -> usize {
        self.state.displayed.read().items.len()
    }

    /// The item at output `row`, or `None` if there is no such row.
    pub fn item(&self, row: usize) -> Option<Arc<T>> {
        self.state.displayed.read().items.get(row).cloned()
    }

    /// The source row shown at output `row`.
    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        self.state.displayed.read().mapping.get(row).copied()
    }

    /// The generation of the output last applied; `0` before the first.
    pub fn displayed_generation(&self) -> u64 {
        self.state.displayed.read().generation
    }

    /// Emitted with the new row count each time an output is applied.
    pub fn output_changed(&self) -> &Signal<usize> {
        &self.state.output_changed
    }
}

impl<T: Item + ?Sized + 'static> std::fmt::Debug for FilterTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterTable")
            .field("functions", &self.state.functions)
            .field("selection", &self.selection().selected_indices())
            .field("rows", &self.row_count())
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Builder for [`FilterTable`].
pub struct FilterTableBuilder<T: ?Sized> {
    functions: Vec<TableFunction<T>>,
    default_sort: Option<Sort<T>>,
    filter_mode: FilterMode,
    initial_selection: Vec<usize>,
    source: Vec<Arc<T>>,
    checkpoint_stride: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl<T: Item + ?Sized + 'static> FilterTableBuilder<T> {
    /// Creates a new builder over `functions`.
    pub fn new(functions: Vec<TableFunction<T>>) -> Self {
        Self {
            functions,
            default_sort: None,
            filter_mode: FilterMode::default(),
            initial_selection: Vec::new(),
            source: Vec::new(),
            checkpoint_stride: DEFAULT_CHECKPOINT_STRIDE,
            pool: None,
        }
    }

    /// Sort used when no sort is selected.
    pub fn default_sort(mut self, sort: Sort<T>) -> Self {
        self.default_sort = Some(sort);
        self
    }

    /// How many filters may be selected at once.
    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Indices selected when the table is built.
    pub fn initial_selection(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.initial_selection = indices.into();
        self
    }

    /// The initial source collection.
    pub fn source(mut self, items: Vec<Arc<T>>) -> Self {
        self.source = items;
        self
    }

    /// Rows evaluated between cancellation checks.
    pub fn checkpoint_stride(mut self, stride: usize) -> Self {
        self.checkpoint_stride = stride.max(1);
        self
    }

    /// Apply the settings from `config` that concern tables.
    pub fn config(self, config: &QuadrantConfig) -> Self {
        self.checkpoint_stride(config.checkpoint_stride)
    }

    /// Worker pool for evaluations. Defaults to the global pool.
    pub fn pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Build the table and issue its first evaluation.
    ///
    /// Fails if an initial selection index is out of range.
    pub fn build(self, context: &MainContext) -> Result<FilterTable<T>> {
        let mut selection = TableSelection::for_functions(&self.functions, self.filter_mode);
        selection.set_selection(&self.initial_selection)?;

        let pool = self.pool.unwrap_or_else(ThreadPool::global);
        let table = FilterTable {
            state: Arc::new(TableState {
                functions: self.functions,
                default_sort: self.default_sort,
                selection: Mutex::new(selection),
                source: RwLock::new(Arc::new(self.source)),
                displayed: RwLock::new(Displayed::empty()),
                recomputer: Recomputer::new("filter_table", pool, context.handle()),
                checkpoint_stride: self.checkpoint_stride,
                affinity: context.affinity(),
                output_changed: Signal::new(),
            }),
        };

        table.update();
        Ok(table)
    }
}

static_assertions::assert_impl_all!(FilterTable<crate::items::Resource>: Send, Sync);
