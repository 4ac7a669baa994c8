use crate::config::GeocodingConfig;
use crate::model::listing::GeoPoint;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(String),

    #[error("Geocoding response could not be parsed: {0}")]
    Malformed(String),

    #[error("No results for the given address")]
    ZeroResults,
}

/// Address resolution seam; production wiring uses [`HttpGeocoder`].
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}

// Google-geocode-shaped response body

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Extract a coordinate from a geocoding response.
///
/// Fails when the API reports zero results or the first result carries no
/// usable coordinate.
pub fn parse_geocode_response(response: GeocodeResponse) -> Result<GeoPoint, GeocodeError> {
    if response.status == "ZERO_RESULTS" {
        return Err(GeocodeError::ZeroResults);
    }

    if response.status != "OK" {
        return Err(GeocodeError::Malformed(format!(
            "unexpected status '{}'",
            response.status
        )));
    }

    let location = response
        .results
        .into_iter()
        .next()
        .map(|r| r.geometry.location)
        .ok_or(GeocodeError::ZeroResults)?;

    Ok(GeoPoint {
        lat: location.lat,
        lng: location.lng,
    })
}

#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    config: GeocodingConfig,
}

impl HttpGeocoder {
    pub fn new(config: GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                error!("Failed to build geocoding HTTP client: {}", e);
                GeocodeError::Request(format!("Client creation failed: {}", e))
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    #[instrument(skip(self, address))]
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        info!("Resolving address through geocoding API");

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[("address", address), ("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("Geocoding request failed: {}", e);
                GeocodeError::Request(e.to_string())
            })?;

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            error!("Failed to parse geocoding response: {}", e);
            GeocodeError::Malformed(e.to_string())
        })?;
        debug!("Geocoding API returned status '{}'", body.status);

        parse_geocode_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).expect("fixture should deserialize")
    }

    #[test]
    fn test_parse_ok_response() {
        let response = response_from_json(
            r#"{
                "status": "OK",
                "results": [
                    { "geometry": { "location": { "lat": 59.32, "lng": 18.06 } } },
                    { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
                ]
            }"#,
        );
        let point = parse_geocode_response(response).unwrap();
        assert_eq!(point.lat, 59.32);
        assert_eq!(point.lng, 18.06);
    }

    #[test]
    fn test_parse_zero_results() {
        let response = response_from_json(r#"{ "status": "ZERO_RESULTS", "results": [] }"#);
        assert!(matches!(
            parse_geocode_response(response),
            Err(GeocodeError::ZeroResults)
        ));
    }

    #[test]
    fn test_parse_ok_without_results_is_zero_results() {
        let response = response_from_json(r#"{ "status": "OK", "results": [] }"#);
        assert!(matches!(
            parse_geocode_response(response),
            Err(GeocodeError::ZeroResults)
        ));
    }

    #[test]
    fn test_parse_error_status_is_malformed() {
        let response = response_from_json(r#"{ "status": "REQUEST_DENIED", "results": [] }"#);
        assert!(matches!(
            parse_geocode_response(response),
            Err(GeocodeError::Malformed(_))
        ));
    }
}
