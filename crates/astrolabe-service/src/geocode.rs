//! Place search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use astrolabe_config::GeocoderSettings;

pub const MIN_QUERY_LEN: usize = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("Search query must be at least 3 characters")]
    QueryTooShort,
    #[error("Geocoder request failed: {0}")]
    Transport(String),
    #[error("Geocoder returned HTTP {0}")]
    Status(u16),
}

/// One candidate match. Coordinates stay decimal strings, as the upstream returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;
}

pub(crate) fn validate_query(query: &str) -> Result<&str, GeocodeError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(GeocodeError::QueryTooShort);
    }
    Ok(query)
}

/// OpenStreetMap Nominatim search client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, user_agent: &str, limit: u32, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
        })
    }

    pub fn from_settings(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        Self::new(
            settings.base_url.as_str(),
            &settings.user_agent,
            settings.limit,
            settings.timeout(),
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let query = validate_query(query)?;
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        response
            .json::<Vec<Place>>()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_queries_rejected() {
        assert_eq!(validate_query(" ab "), Err(GeocodeError::QueryTooShort));
        assert_eq!(validate_query(" Oslo "), Ok("Oslo"));
    }

    #[test]
    fn test_nominatim_payload_keeps_string_coordinates() {
        let raw = r#"[{"place_id": 1, "display_name": "Oslo, Norway", "lat": "59.9133301", "lon": "10.7389701"}]"#;
        let places: Vec<Place> = serde_json::from_str(raw).unwrap();
        assert_eq!(places[0].lat, "59.9133301");
        assert_eq!(places[0].display_name, "Oslo, Norway");
    }
}
