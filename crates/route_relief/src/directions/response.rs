//! Wire model for directions and geocoding responses.
//!
//! Only the fields the chain builder and geocoder need are modelled; everything else in
//! the provider payload is ignored. Missing optional fields default to empty values.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::LatLng;

/// Status tag of a successful provider call.
pub const STATUS_OK: &str = "OK";

/// A numeric quantity with its human-readable rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedPolyline {
    #[serde(default)]
    pub points: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl From<Location> for LatLng {
    fn from(value: Location) -> Self {
        LatLng::new(value.lat, value.lng)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub travel_mode: String,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub polyline: EncodedPolyline,
    #[serde(default)]
    pub start_location: Option<Location>,
    #[serde(default)]
    pub end_location: Option<Location>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub start_address: Option<String>,
    #[serde(default)]
    pub end_address: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Top-level directions payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl DirectionsResponse {
    /// Parse a raw provider body. Bodies that are not valid JSON are malformed responses.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Fail with [`Error::Provider`] unless the status is `OK`.
    pub fn ensure_ok(&self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        Err(Error::provider(
            self.status.clone(),
            self.error_message.clone().unwrap_or_default(),
        ))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
}

/// Top-level geocoding payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

impl GeocodeResponse {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Location of the first result, requiring an `OK` status.
    pub fn first_location(&self) -> Result<LatLng> {
        if self.status != STATUS_OK {
            return Err(Error::provider(
                self.status.clone(),
                self.error_message.clone().unwrap_or_default(),
            ));
        }
        self.results
            .first()
            .map(|r| r.geometry.location.into())
            .ok_or_else(|| Error::MalformedResponse("geocode returned no results".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "OK",
        "geocoded_waypoints": [],
        "routes": [{
            "summary": "I-64 E",
            "legs": [{
                "start_address": "Louisville, KY",
                "steps": [{
                    "travel_mode": "DRIVING",
                    "duration": { "value": 60, "text": "1 min" },
                    "distance": { "value": 500, "text": "0.3 mi" },
                    "polyline": { "points": "_p~iF~ps|U" },
                    "html_instructions": "Head north"
                }]
            }]
        }]
    }"#;

    #[test]
    fn parses_nested_routes_and_ignores_unknown_fields() {
        let response = DirectionsResponse::parse(SAMPLE).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.routes.len(), 1);
        let step = &response.routes[0].legs[0].steps[0];
        assert_eq!(step.travel_mode, "DRIVING");
        assert_eq!(step.duration.value, 60.0);
        assert_eq!(step.polyline.points, "_p~iF~ps|U");
    }

    #[test]
    fn non_ok_status_is_provider_error() {
        let response = DirectionsResponse::parse(
            r#"{"status":"REQUEST_DENIED","error_message":"bad key","routes":[]}"#,
        )
        .unwrap();
        let err = response.ensure_ok().unwrap_err();
        match err {
            Error::Provider { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = DirectionsResponse::parse("<html>").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn geocode_first_location() {
        let response = GeocodeResponse::parse(
            r#"{"status":"OK","results":[{"formatted_address":"x","geometry":{"location":{"lat":38.25,"lng":-85.6}}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_location().unwrap(), LatLng::new(38.25, -85.6));

        let empty = GeocodeResponse::parse(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(matches!(
            empty.first_location().unwrap_err(),
            Error::Provider { .. }
        ));
    }
}
