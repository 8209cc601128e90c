//! Selection state for a list of table functions.
//!
//! [`TableSelection`] keeps two independent selection sets over one ordered
//! list of table functions: the selected filters (any number, or exactly
//! zero or one in [`FilterMode::Single`]) and the selected sort (zero or
//! one). Every mutation validates its indices first, so a failed call leaves
//! the selection untouched.
//!
//! # Example
//!
//! ```
//! use quadrant::selection::{FilterMode, TableSelection};
//! use quadrant::table_function::FunctionKind;
//!
//! let kinds = [FunctionKind::Sort, FunctionKind::Filter, FunctionKind::Filter];
//! let mut selection = TableSelection::new(&kinds, FilterMode::Multiple);
//!
//! selection.select_sort(Some(0)).unwrap();
//! selection.toggle_filter(1).unwrap();
//! selection.toggle_filter(2).unwrap();
//! assert_eq!(selection.selected_indices(), vec![0, 1, 2]);
//!
//! assert!(selection.toggle_filter(0).is_err());
//! ```

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::table_function::{FunctionKind, TableFunction};

/// How many filters may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Any number of filters, combined with OR.
    #[default]
    Multiple,
    /// At most one filter; selecting one deselects the others.
    Single,
}

/// The selected filters and sort of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSelection {
    kinds: Vec<FunctionKind>,
    filters: BTreeSet<usize>,
    sort: Option<usize>,
    mode: FilterMode,
}

impl TableSelection {
    /// Create an empty selection for functions of the given kinds.
    pub fn new(kinds: &[FunctionKind], mode: FilterMode) -> Self {
        Self {
            kinds: kinds.to_vec(),
            filters: BTreeSet::new(),
            sort: None,
            mode,
        }
    }

    /// Create an empty selection for `functions`.
    pub fn for_functions<T: ?Sized>(functions: &[TableFunction<T>], mode: FilterMode) -> Self {
        let kinds: Vec<FunctionKind> = functions.iter().map(TableFunction::kind).collect();
        Self::new(&kinds, mode)
    }

    /// The number of table functions this selection covers.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether there are no table functions at all.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The filter mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.mode
    }

    fn kind_of(&self, index: usize) -> Result<FunctionKind> {
        self.kinds
            .get(index)
            .copied()
            .ok_or_else(|| Error::out_of_range(index, self.kinds.len()))
    }

    /// Flip the selected state of the filter at `index`.
    ///
    /// Other filters are unaffected unless the mode is [`FilterMode::Single`],
    /// in which case selecting a filter deselects every other filter. Returns
    /// whether the filter is now selected.
    pub fn toggle_filter(&mut self, index: usize) -> Result<bool> {
        if self.kind_of(index)? != FunctionKind::Filter {
            return Err(Error::NotAFilter { index });
        }

        if self.filters.remove(&index) {
            return Ok(false);
        }
        if self.mode == FilterMode::Single {
            self.filters.clear();
        }
        self.filters.insert(index);
        Ok(true)
    }

    /// Select the sort at `index` exclusively, or revert to the default sort
    /// with `None`.
    pub fn select_sort(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(index) = index
            && self.kind_of(index)? != FunctionKind::Sort
        {
            return Err(Error::NotASort { index });
        }
        self.sort = index;
        Ok(())
    }

    /// Replace the whole selection with `indices`.
    ///
    /// Filter indices are selected, subject to the filter mode (the last
    /// listed filter wins in single mode). Of several sort indices the last
    /// one listed wins. An out-of-range index rejects the call.
    pub fn set_selection(&mut self, indices: &[usize]) -> Result<()> {
        let mut filters = BTreeSet::new();
        let mut sort = None;

        for &index in indices {
            match self.kind_of(index)? {
                FunctionKind::Filter => {
                    if self.mode == FilterMode::Single {
                        filters.clear();
                    }
                    filters.insert(index);
                }
                FunctionKind::Sort => sort = Some(index),
            }
        }

        self.filters = filters;
        self.sort = sort;
        Ok(())
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.sort = None;
    }

    /// Whether the function at `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.sort == Some(index) || self.filters.contains(&index)
    }

    /// Selected filter indices, ascending.
    pub fn selected_filters(&self) -> impl Iterator<Item = usize> + '_ {
        self.filters.iter().copied()
    }

    /// Number of selected filters.
    pub fn selected_filter_count(&self) -> usize {
        self.filters.len()
    }

    /// The selected sort, if any.
    pub fn selected_sort(&self) -> Option<usize> {
        self.sort
    }

    /// Every selected index, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.filters.iter().copied().chain(self.sort).collect();
        indices.sort_unstable();
        indices
    }
}
