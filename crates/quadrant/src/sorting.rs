//! Stock table functions.
//!
//! The filters and sorts every campus list reuses. Each one asks for the
//! smallest capability it needs and treats a missing facet as a defined
//! default: unknown hours are "not open", an unknown location is `(0, 0)`.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::capability::{Favoritable, HasOpenTimes, Item, Locatable};
use crate::config::QuadrantConfig;
use crate::distance::{
    LocationProvider, METERS_PER_MILE, ReferencePoint, compare_by_distance, distance_to,
};
use crate::table_function::{Filter, PredicateFn, Sort};

/// Label of the alphabetical sort.
pub const ALPHABETICAL_LABEL: &str = "A-Z";
/// Label of the distance sort and the radius filter.
pub const NEARBY_LABEL: &str = "Nearby";
/// Label of the open-now filter.
pub const OPEN_LABEL: &str = "Open";
/// Label of the favorites filter.
pub const FAVORITES_LABEL: &str = "Favorites";

/// Case-insensitive comparison of display names.
pub fn compare_alphabetical<T: Item + ?Sized>(a: &T, b: &T) -> Ordering {
    let lhs = a.display_name().chars().flat_map(char::to_lowercase);
    let rhs = b.display_name().chars().flat_map(char::to_lowercase);
    lhs.cmp(rhs)
}

/// Sort by display name, ignoring case. The usual default sort.
pub fn alphabetical<T: Item + ?Sized + 'static>() -> Sort<T> {
    Sort::new(ALPHABETICAL_LABEL, compare_alphabetical::<T>)
}

/// Sort by distance from the user's location.
///
/// The location is read once per evaluation, so a fix arriving mid-sort
/// cannot make the order inconsistent.
pub fn nearby<T: Locatable + ?Sized + 'static>(reference: ReferencePoint) -> Sort<T> {
    Sort::deferred(NEARBY_LABEL, move || compare_by_distance::<T>(reference.resolve()))
}

/// Keep items within `radius_miles` of the user's location.
///
/// Like [`nearby`], the location is read once per evaluation.
pub fn nearby_filter<T: Locatable + ?Sized + 'static>(
    reference: ReferencePoint,
    radius_miles: f64,
) -> Filter<T> {
    let radius_meters = radius_miles * METERS_PER_MILE;
    Filter::deferred(NEARBY_LABEL, move || {
        let center = reference.resolve();
        let within: PredicateFn<T> =
            Arc::new(move |item: &T| distance_to(center, item) <= radius_meters);
        within
    })
}

/// [`nearby_filter`] with the campus center and radius from `config`.
pub fn nearby_filter_from_config<T: Locatable + ?Sized + 'static>(
    provider: Arc<dyn LocationProvider>,
    config: &QuadrantConfig,
) -> Filter<T> {
    nearby_filter(ReferencePoint::from_config(provider, config), config.nearby_radius_miles)
}

/// Keep items that are open right now. Unknown hours count as closed.
pub fn open_now<T: HasOpenTimes + ?Sized + 'static>() -> Filter<T> {
    open_with_clock(|| Local::now().naive_local())
}

/// Keep items open at the time `clock` reports.
///
/// The clock is read once per evaluation.
pub fn open_with_clock<T, C>(clock: C) -> Filter<T>
where
    T: HasOpenTimes + ?Sized + 'static,
    C: Fn() -> NaiveDateTime + Send + Sync + 'static,
{
    Filter::deferred(OPEN_LABEL, move || {
        let now = clock();
        let open: PredicateFn<T> = Arc::new(move |item: &T| item.is_open_at(now).unwrap_or(false));
        open
    })
}

/// Keep items the user has marked as favorites.
pub fn favorites<T: Favoritable + ?Sized + 'static>() -> Filter<T> {
    Filter::new(FAVORITES_LABEL, |item: &T| item.is_favorited())
}

/// Sort that keeps the engine's input order.
pub fn source_order<T: ?Sized + 'static>() -> Sort<T> {
    Sort::new("Default", |_: &T, _: &T| Ordering::Equal)
}
