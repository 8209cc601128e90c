//! Concrete campus entities.
//!
//! Each type implements the capability traits it actually has. The data
//! source that fills them in lives outside this crate; the constructors
//! here take already-parsed values.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::capability::{
    DEFAULT_LOCATION_DESCRIPTION, Favoritable, HasImage, HasOccupancy, HasOpenTimes,
    HasPhoneNumber, Item, Locatable, Searchable,
};
use crate::hours::WeeklyHours;

const NO_OCCUPANCY: u8 = u8::MAX;

/// A campus library.
#[derive(Debug)]
pub struct Library {
    name: String,
    address: Option<String>,
    phone_number: Option<String>,
    image_url: Option<String>,
    weekly_hours: Option<WeeklyHours>,
    by_appointment: [bool; 7],
    latitude: Option<f64>,
    longitude: Option<f64>,
    favorited: AtomicBool,
    occupancy: AtomicU8,
}

impl Library {
    /// A library with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone_number: None,
            image_url: None,
            weekly_hours: None,
            by_appointment: [false; 7],
            latitude: None,
            longitude: None,
            favorited: AtomicBool::new(false),
            occupancy: AtomicU8::new(NO_OCCUPANCY),
        }
    }

    /// Set the street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the phone number.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Set the image link.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the weekly hours.
    pub fn with_hours(mut self, hours: WeeklyHours) -> Self {
        self.weekly_hours = Some(hours);
        self
    }

    /// Set which weekdays (Monday first) are by appointment only.
    pub fn with_by_appointment(mut self, days: [bool; 7]) -> Self {
        self.by_appointment = days;
        self
    }

    /// Set the position.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Which weekdays (Monday first) are by appointment only.
    pub fn by_appointment(&self) -> [bool; 7] {
        self.by_appointment
    }

    /// Record a new occupancy reading, clamped to 100%.
    pub fn set_occupancy_percent(&self, percent: u8) {
        self.occupancy.store(percent.min(100), Ordering::Relaxed);
    }
}

impl Item for Library {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Locatable for Library {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

impl Searchable for Library {
    fn location_description(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_LOCATION_DESCRIPTION)
    }
}

impl Favoritable for Library {
    fn is_favorited(&self) -> bool {
        self.favorited.load(Ordering::Relaxed)
    }

    fn set_favorited(&self, favorited: bool) {
        self.favorited.store(favorited, Ordering::Relaxed);
    }
}

impl HasOpenTimes for Library {
    fn weekly_hours(&self) -> Option<&WeeklyHours> {
        self.weekly_hours.as_ref()
    }
}

impl HasOccupancy for Library {
    fn occupancy_percent(&self) -> Option<u8> {
        match self.occupancy.load(Ordering::Relaxed) {
            NO_OCCUPANCY => None,
            percent => Some(percent),
        }
    }
}

impl HasImage for Library {
    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

impl HasPhoneNumber for Library {
    fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }
}

/// Category of a campus resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Health services.
    Health,
    /// Financial aid and counselling.
    Finances,
    /// Legal services.
    Legal,
    /// Food, housing and other basic needs.
    BasicNeeds,
    /// Administrative offices.
    Admin,
}

impl ResourceType {
    /// Every resource type, in display order.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Health,
        ResourceType::Finances,
        ResourceType::Legal,
        ResourceType::BasicNeeds,
        ResourceType::Admin,
    ];

    /// The display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Health => "Health",
            ResourceType::Finances => "Finances",
            ResourceType::Legal => "Legal",
            ResourceType::BasicNeeds => "Basic Needs",
            ResourceType::Admin => "Admin",
        }
    }

    /// Parse a display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A campus resource: a health center, an aid office, a food pantry.
#[derive(Debug)]
pub struct Resource {
    name: String,
    address: Option<String>,
    description: String,
    resource_type: Option<ResourceType>,
    weekly_hours: Option<WeeklyHours>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl Resource {
    /// Default radius, in miles, of the "Nearby" filter for resources.
    pub const NEARBY_DISTANCE_MILES: f64 = 10.0;

    /// A resource with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            description: String::new(),
            resource_type: None,
            weekly_hours: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Set the street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category.
    pub fn with_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Set the weekly hours.
    pub fn with_hours(mut self, hours: WeeklyHours) -> Self {
        self.weekly_hours = Some(hours);
        self
    }

    /// Set the position.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// The description, empty if none was given.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The category, if known.
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.resource_type
    }
}

impl Item for Resource {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Locatable for Resource {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

impl Searchable for Resource {
    fn location_description(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_LOCATION_DESCRIPTION)
    }
}

impl HasOpenTimes for Resource {
    fn weekly_hours(&self) -> Option<&WeeklyHours> {
        self.weekly_hours.as_ref()
    }
}

/// A dining hall, cafe or market.
#[derive(Debug)]
pub struct DiningLocation {
    name: String,
    address: Option<String>,
    phone_number: Option<String>,
    image_url: Option<String>,
    weekly_hours: Option<WeeklyHours>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    favorited: AtomicBool,
}

impl DiningLocation {
    /// A dining location with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone_number: None,
            image_url: None,
            weekly_hours: None,
            latitude: None,
            longitude: None,
            favorited: AtomicBool::new(false),
        }
    }

    /// Set the street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the phone number.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Set the image link.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the weekly hours.
    pub fn with_hours(mut self, hours: WeeklyHours) -> Self {
        self.weekly_hours = Some(hours);
        self
    }

    /// Set the position.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

impl Item for DiningLocation {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Locatable for DiningLocation {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

impl Searchable for DiningLocation {
    fn location_description(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_LOCATION_DESCRIPTION)
    }
}

impl Favoritable for DiningLocation {
    fn is_favorited(&self) -> bool {
        self.favorited.load(Ordering::Relaxed)
    }

    fn set_favorited(&self, favorited: bool) {
        self.favorited.store(favorited, Ordering::Relaxed);
    }
}

impl HasOpenTimes for DiningLocation {
    fn weekly_hours(&self) -> Option<&WeeklyHours> {
        self.weekly_hours.as_ref()
    }
}

impl HasImage for DiningLocation {
    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

impl HasPhoneNumber for DiningLocation {
    fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }
}

/// Kind of a point of interest on the campus map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMarkerType {
    /// Cafes and coffee carts.
    Cafe,
    /// Convenience stores.
    Store,
    /// Counselling and wellness rooms.
    MentalHealth,
    /// Printers open to students.
    Printer,
    /// Water refill stations.
    Water,
    /// Bike racks and repair stands.
    Bikes,
    /// Lactation rooms.
    Lactation,
    /// Rest and nap spaces.
    Rest,
    /// Public microwaves.
    Microwave,
}

impl MapMarkerType {
    /// Every marker type, in filter-bar order.
    pub const ALL: [MapMarkerType; 9] = [
        MapMarkerType::Cafe,
        MapMarkerType::Store,
        MapMarkerType::MentalHealth,
        MapMarkerType::Printer,
        MapMarkerType::Water,
        MapMarkerType::Bikes,
        MapMarkerType::Lactation,
        MapMarkerType::Rest,
        MapMarkerType::Microwave,
    ];

    /// The display name, used as the filter label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapMarkerType::Cafe => "Cafe",
            MapMarkerType::Store => "Store",
            MapMarkerType::MentalHealth => "Mental Health",
            MapMarkerType::Printer => "Printer",
            MapMarkerType::Water => "Water",
            MapMarkerType::Bikes => "Bikes",
            MapMarkerType::Lactation => "Lactation",
            MapMarkerType::Rest => "Rest",
            MapMarkerType::Microwave => "Microwave",
        }
    }
}

impl fmt::Display for MapMarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest on the campus map.
#[derive(Debug, Clone)]
pub struct MapMarker {
    name: String,
    marker_type: MapMarkerType,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl MapMarker {
    /// Create a marker.
    pub fn new(name: impl Into<String>, marker_type: MapMarkerType, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            marker_type,
            description: None,
            latitude,
            longitude,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The marker's kind.
    pub fn marker_type(&self) -> MapMarkerType {
        self.marker_type
    }

    /// The description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Item for MapMarker {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Locatable for MapMarker {
    fn latitude(&self) -> Option<f64> {
        Some(self.latitude)
    }

    fn longitude(&self) -> Option<f64> {
        Some(self.longitude)
    }
}

impl Searchable for MapMarker {}

static_assertions::assert_impl_all!(Library: Send, Sync);
static_assertions::assert_impl_all!(Resource: Send, Sync);
static_assertions::assert_impl_all!(DiningLocation: Send, Sync);
static_assertions::assert_impl_all!(MapMarker: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Coordinate;

    #[test]
    fn test_library_location_defaults() {
        let library = Library::new("Doe Library");
        assert_eq!(library.coordinate(), Coordinate::SENTINEL);
        assert!(!library.has_valid_location());
        assert_eq!(library.location_description(), "Berkeley, CA");
        assert_eq!(library.search_name(), "Doe Library");

        let located = Library::new("Moffitt")
            .with_address("350 Moffitt Library")
            .with_location(37.8726, -122.2607);
        assert!(located.has_valid_location());
        assert_eq!(located.location_description(), "350 Moffitt Library");
    }

    #[test]
    fn test_library_facets() {
        let library = Library::new("Main Stacks")
            .with_phone_number("510-642-6657")
            .with_image_url("https://example.org/stacks.jpg")
            .with_by_appointment([false, false, false, false, false, true, true]);

        assert_eq!(library.phone_number(), Some("510-642-6657"));
        assert!(library.image_url().is_some());
        assert!(library.weekly_hours().is_none());
        assert!(library.is_open_now().is_none());
        assert!(library.by_appointment()[6]);

        assert_eq!(library.occupancy_percent(), None);
        library.set_occupancy_percent(140);
        assert_eq!(library.occupancy_percent(), Some(100));
    }

    #[test]
    fn test_favorite_toggle() {
        let cafe = DiningLocation::new("Golden Bear Cafe");
        assert!(!cafe.is_favorited());
        cafe.set_favorited(true);
        assert!(cafe.is_favorited());
    }

    #[test]
    fn test_resource_type_names() {
        assert_eq!(ResourceType::BasicNeeds.to_string(), "Basic Needs");
        assert_eq!(ResourceType::from_name("Legal"), Some(ResourceType::Legal));
        assert_eq!(ResourceType::from_name("Parking"), None);

        let resource = Resource::new("Tang Center")
            .with_type(ResourceType::Health)
            .with_description("University Health Services");
        assert_eq!(resource.resource_type(), Some(ResourceType::Health));
        assert_eq!(resource.description(), "University Health Services");
    }

    #[test]
    fn test_map_marker() {
        let marker = MapMarker::new("Doe printer", MapMarkerType::Printer, 37.8722, -122.2594)
            .with_description("Ground floor");
        assert_eq!(marker.marker_type().to_string(), "Printer");
        assert_eq!(marker.description(), Some("Ground floor"));
        assert!(marker.has_valid_location());
        assert_eq!(MapMarkerType::ALL.len(), 9);
    }
}
