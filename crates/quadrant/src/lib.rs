//! Quadrant: filtering, sorting and search for campus directories.
//!
//! Campus lists (libraries, resources, dining locations, map markers) share
//! one engine. A list declares its [table functions](table_function), the
//! user picks filters and at most one sort through a
//! [selection](selection), and the [engine] turns the source collection
//! into the displayed rows:
//!
//! - selected filters combine with OR; no selection shows everything
//! - the sort is stable, falling back to the list's default sort
//! - evaluations run off the main context and only the latest one is shown
//!
//! [`FilterTable`] wraps this into a stateful table, and [`SearchController`]
//! does the same for keyword search over a heterogeneous corpus.
//!
//! # Example
//!
//! ```
//! use quadrant::prelude::*;
//! use std::sync::Arc;
//!
//! let libraries = vec![
//!     Arc::new(Library::new("Moffitt Library")),
//!     Arc::new(Library::new("Doe Library")),
//! ];
//! libraries[0].set_favorited(true);
//!
//! let functions: Vec<TableFunction<Library>> =
//!     vec![sorting::favorites::<Library>().into(), sorting::alphabetical::<Library>().into()];
//! let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);
//! selection.toggle_filter(0).unwrap();
//!
//! let shown = evaluate(&libraries, &functions, &selection, None);
//! assert_eq!(shown.len(), 1);
//! assert_eq!(shown[0].display_name(), "Moffitt Library");
//! ```

pub mod capability;
pub mod config;
pub mod distance;
pub mod engine;
mod error;
pub mod filter_table;
pub mod group;
pub mod hours;
pub mod items;
pub mod prelude;
pub mod search;
pub mod selection;
pub mod sorting;
pub mod table_function;

pub use error::{Error, Result};
pub use filter_table::{FilterTable, FilterTableBuilder};
pub use search::{Placemark, SearchController, SearchState};

pub use quadrant_core;
