//! Capability traits.
//!
//! Every item has a display name ([`Item`]). Everything else is an optional
//! facet expressed as its own trait, and an item type implements whichever
//! subset it actually has. Engine functions are generic over the smallest
//! set of capabilities they need: distance sorting asks for [`Locatable`],
//! the "Open" filter for [`HasOpenTimes`], and so on.
//!
//! # Example
//!
//! ```
//! use quadrant::capability::{Item, Locatable};
//!
//! struct Bench {
//!     name: String,
//!     lat: Option<f64>,
//!     lon: Option<f64>,
//! }
//!
//! impl Item for Bench {
//!     fn display_name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! impl Locatable for Bench {
//!     fn latitude(&self) -> Option<f64> {
//!         self.lat
//!     }
//!     fn longitude(&self) -> Option<f64> {
//!         self.lon
//!     }
//! }
//!
//! let unknown = Bench { name: "Lost bench".into(), lat: None, lon: None };
//! assert!(!unknown.has_valid_location());
//! assert!(unknown.coordinate().is_sentinel());
//! ```

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::hours::WeeklyHours;

/// The location description used when an item has no address.
pub const DEFAULT_LOCATION_DESCRIPTION: &str = "Berkeley, CA";

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// The `(0, 0)` pair that stands for "no known location".
    pub const SENTINEL: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Create a coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is the unknown-location sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// The one facet every item has.
pub trait Item: Send + Sync {
    /// Name shown in rows, annotations and search results.
    fn display_name(&self) -> &str;

    /// Whether the item stands for at least one underlying entity.
    ///
    /// Only groups can be empty. An item without members never passes an
    /// active filter.
    fn has_members(&self) -> bool {
        true
    }
}

/// Items with an optional position.
///
/// A missing coordinate, or `0.0`, means the location is unknown. That is a
/// normal state, not an error.
pub trait Locatable: Item {
    /// Latitude in degrees, if known.
    fn latitude(&self) -> Option<f64>;

    /// Longitude in degrees, if known.
    fn longitude(&self) -> Option<f64>;

    /// The position, with missing parts substituted by `0.0`.
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(
            self.latitude().unwrap_or(0.0),
            self.longitude().unwrap_or(0.0),
        )
    }

    /// Whether both coordinates are present and neither is the `0.0` sentinel.
    fn has_valid_location(&self) -> bool {
        matches!(
            (self.latitude(), self.longitude()),
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0
        )
    }
}

/// Items the user can mark as a favorite.
///
/// Items are shared behind `Arc`, so implementations use interior
/// mutability for the flag.
pub trait Favoritable: Item {
    /// Whether the item is currently a favorite.
    fn is_favorited(&self) -> bool;

    /// Mark or unmark the item as a favorite.
    fn set_favorited(&self, favorited: bool);
}

/// Items with weekly opening hours.
pub trait HasOpenTimes: Item {
    /// The weekly hours, if known.
    fn weekly_hours(&self) -> Option<&WeeklyHours>;

    /// Whether the item is open at `at`, or `None` if hours are unknown.
    fn is_open_at(&self, at: NaiveDateTime) -> Option<bool> {
        self.weekly_hours().map(|hours| hours.is_open_at(at))
    }

    /// Whether the item is open right now, in local time.
    fn is_open_now(&self) -> Option<bool> {
        self.is_open_at(Local::now().naive_local())
    }
}

/// Items that report how busy they are.
pub trait HasOccupancy: Item {
    /// Current occupancy as a percentage of capacity.
    fn occupancy_percent(&self) -> Option<u8>;
}

/// Items with a picture.
pub trait HasImage: Item {
    /// Link to the image, if any.
    fn image_url(&self) -> Option<&str>;
}

/// Items with a phone number.
pub trait HasPhoneNumber: Item {
    /// Phone number, if any.
    fn phone_number(&self) -> Option<&str>;
}

/// Items that take part in keyword search.
pub trait Searchable: Locatable {
    /// Text matched against the keyword.
    fn search_name(&self) -> &str {
        self.display_name()
    }

    /// Human-readable place description shown under a search result.
    fn location_description(&self) -> &str {
        DEFAULT_LOCATION_DESCRIPTION
    }
}

/// Object-safe name for "anything searchable", used for mixed corpora.
///
/// ```
/// use quadrant::capability::SearchItem;
/// use quadrant::items::{Library, Resource};
/// use std::sync::Arc;
///
/// let corpus: Vec<Arc<dyn SearchItem>> = vec![
///     Arc::new(Library::new("Doe Library")),
///     Arc::new(Resource::new("Tang Center")),
/// ];
/// assert_eq!(corpus.len(), 2);
/// ```
pub trait SearchItem: Searchable {}

impl<T: Searchable + ?Sized> SearchItem for T {}
