//! Distance ordering.
//!
//! Items are ordered by great-circle (haversine) distance from a reference
//! point. An item with a missing or sentinel location is measured as if it
//! sat at `(0, 0)`, which puts it far from any campus and keeps the order
//! deterministic. The comparator itself never breaks ties; the engine's
//! stable sort keeps tied items in input order.
//!
//! The reference point comes from a [`LocationProvider`]. When the provider
//! has no fix, a fallback coordinate is used instead.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::capability::{Coordinate, Locatable};
use crate::config::QuadrantConfig;
use crate::table_function::CompareFn;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Metres in one statute mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Great-circle distance between two coordinates, in metres.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Distance from `reference` to `item`, in metres.
pub fn distance_to<T: Locatable + ?Sized>(reference: Coordinate, item: &T) -> f64 {
    haversine_meters(reference, item.coordinate())
}

/// A comparator ordering items by ascending distance from `reference`.
pub fn compare_by_distance<T: Locatable + ?Sized + 'static>(reference: Coordinate) -> CompareFn<T> {
    Arc::new(move |a: &T, b: &T| -> Ordering {
        distance_to(reference, a).total_cmp(&distance_to(reference, b))
    })
}

/// Supplies the user's current position.
pub trait LocationProvider: Send + Sync {
    /// The current position, or `None` without a fix.
    fn current_location(&self) -> Option<Coordinate>;
}

/// A provider that always reports the same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Option<Coordinate> {
        self.0
    }
}

/// A provider updated by whoever receives location fixes.
#[derive(Debug, Default)]
pub struct SharedLocation {
    current: RwLock<Option<Coordinate>>,
}

impl SharedLocation {
    /// A provider with no fix yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new fix.
    pub fn update(&self, location: Coordinate) {
        *self.current.write() = Some(location);
    }

    /// Forget the current fix.
    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

impl LocationProvider for SharedLocation {
    fn current_location(&self) -> Option<Coordinate> {
        *self.current.read()
    }
}

/// A provider paired with the coordinate to use when it has no fix.
#[derive(Clone)]
pub struct ReferencePoint {
    provider: Arc<dyn LocationProvider>,
    fallback: Coordinate,
}

impl ReferencePoint {
    /// Create a reference point.
    pub fn new(provider: Arc<dyn LocationProvider>, fallback: Coordinate) -> Self {
        Self { provider, fallback }
    }

    /// A reference point falling back to the configured campus center.
    pub fn from_config(provider: Arc<dyn LocationProvider>, config: &QuadrantConfig) -> Self {
        Self::new(provider, config.campus_center)
    }

    /// The provider's fix, or the fallback.
    pub fn resolve(&self) -> Coordinate {
        self.provider.current_location().unwrap_or(self.fallback)
    }

    /// The fallback coordinate.
    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }
}

impl std::fmt::Debug for ReferencePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferencePoint")
            .field("current", &self.provider.current_location())
            .field("fallback", &self.fallback)
            .finish()
    }
}
