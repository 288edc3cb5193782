//! Reverse geocoding: coordinates to a display name.
//!
//! Failures degrade to `None`; the store then falls back to a generic label
//! instead of failing the whole location update.

use serde::Deserialize;
use std::time::Duration;

/// Label used when reverse geocoding yields nothing.
pub const FALLBACK_LABEL: &str = "Aktueller Standort";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
}

/// Client for the reverse-geocoding endpoint.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl Geocoder {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
        })
    }

    /// Resolve a place name for the given coordinates.
    ///
    /// Returns the first result's `name`, or `None` on any network, status,
    /// or parse failure.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("language", self.language.clone()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: GeocodeResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let name = body.results?.into_iter().next()?.name;
        if name.is_empty() {
            return None;
        }

        tracing::info!("Reverse geocoded to: {}", name);
        Some(name)
    }
}
