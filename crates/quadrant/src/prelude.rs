//! Commonly used types.
//!
//! ```
//! use quadrant::prelude::*;
//! ```

pub use crate::capability::{
    Coordinate, Favoritable, HasImage, HasOccupancy, HasOpenTimes, HasPhoneNumber, Item, Locatable,
    SearchItem, Searchable,
};
pub use crate::config::QuadrantConfig;
pub use crate::distance::{FixedLocation, LocationProvider, ReferencePoint, SharedLocation};
pub use crate::engine::{evaluate, evaluate_cancellable};
pub use crate::group::{Group, group_by_kind, kind_filter, kind_filters};
pub use crate::hours::{HoursInterval, WeeklyHours};
pub use crate::items::{DiningLocation, Library, MapMarker, MapMarkerType, Resource, ResourceType};
pub use crate::search::{Placemark, SearchController, SearchState, search};
pub use crate::selection::{FilterMode, TableSelection};
pub use crate::sorting;
pub use crate::table_function::{Filter, FunctionKind, Sort, TableFunction};
pub use crate::{Error, FilterTable, Result};

pub use quadrant_core::{MainContext, ThreadPool, ThreadPoolConfig};
