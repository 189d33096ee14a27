//! Blocking client for the Google Directions and Geocoding web services.
use std::time::Duration;

use route_relief::directions::{DirectionsProvider, DirectionsRequest, GeocodeResponse, Geocoder};
use route_relief::error::{Error, Result};
use route_relief::grid::LatLng;
use tracing::debug;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const TIMEOUT: Duration = Duration::from_secs(60);

pub struct GoogleMaps {
    client: reqwest::blocking::Client,
    key: String,
}

fn transport(e: reqwest::Error) -> Error {
    Error::provider("TRANSPORT", e.to_string())
}

impl GoogleMaps {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            key: key.into(),
        })
    }

    /// Read the key from [`API_KEY_ENV`]. A missing or empty key is a configuration error.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(key),
            _ => Err(Error::InvalidConfig(format!(
                "missing environment variable {API_KEY_ENV}"
            ))),
        }
    }

    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", &self.key)])
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::provider(
                format!("HTTP {}", status.as_u16()),
                status.canonical_reason().unwrap_or_default(),
            ));
        }
        response.text().map_err(transport)
    }
}

impl DirectionsProvider for GoogleMaps {
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String> {
        debug!(
            "GET directions {} -> {}.",
            request.origin, request.destination
        );
        self.get(
            DIRECTIONS_URL,
            &[
                ("origin", request.origin.to_query_value()),
                ("destination", request.destination.to_query_value()),
                ("alternatives", request.alternatives.to_string()),
                ("mode", "driving".to_string()),
            ],
        )
    }
}

impl Geocoder for GoogleMaps {
    fn geocode(&mut self, address: &str) -> Result<LatLng> {
        debug!("GET geocode '{}'.", address);
        let raw = self.get(GEOCODE_URL, &[("address", address.to_string())])?;
        GeocodeResponse::parse(&raw)?.first_location()
    }
}
