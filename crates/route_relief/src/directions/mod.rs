//! Directions collaborator: request model, provider traits, response parsing and caching.
//!
//! The library never talks to a network itself. Callers supply a [`DirectionsProvider`]
//! that returns the provider's raw response body; [`CachedDirections`] wraps any provider
//! with a content-addressed on-disk cache.
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::LatLng;

pub mod cache;
pub mod polyline;
pub mod response;

pub use cache::{cache_key, CachedDirections};
pub use response::{DirectionsResponse, GeocodeResponse, Leg, Route, Step};

/// An endpoint of a directions query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    /// Free-form address resolved by the provider.
    Address(String),
    /// Explicit coordinate.
    Coordinate(LatLng),
}

impl Waypoint {
    /// Value suitable for a provider query parameter.
    pub fn to_query_value(&self) -> String {
        match self {
            Waypoint::Address(address) => address.clone(),
            Waypoint::Coordinate(p) => p.to_string(),
        }
    }
}

impl From<LatLng> for Waypoint {
    fn from(value: LatLng) -> Self {
        Waypoint::Coordinate(value)
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

/// Parameters of one directions query. Serialized form is the cache key input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub alternatives: bool,
}

impl DirectionsRequest {
    pub fn new(origin: impl Into<Waypoint>, destination: impl Into<Waypoint>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            alternatives: false,
        }
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }
}

/// Source of directions responses.
pub trait DirectionsProvider {
    /// Issue one query and return the raw response body.
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String>;
}

impl<P: DirectionsProvider + ?Sized> DirectionsProvider for &mut P {
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String> {
        (**self).fetch(request)
    }
}

impl<P: DirectionsProvider + ?Sized> DirectionsProvider for Box<P> {
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String> {
        (**self).fetch(request)
    }
}

/// Resolves free-form addresses to coordinates.
pub trait Geocoder {
    fn geocode(&mut self, address: &str) -> Result<LatLng>;
}

/// Resolve a waypoint to a coordinate, geocoding addresses.
pub fn resolve_waypoint(geocoder: &mut dyn Geocoder, waypoint: &Waypoint) -> Result<LatLng> {
    match waypoint {
        Waypoint::Coordinate(p) => Ok(*p),
        Waypoint::Address(address) => geocoder.geocode(address),
    }
}
