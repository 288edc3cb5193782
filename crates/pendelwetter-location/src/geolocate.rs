//! Position acquisition.
//!
//! The store talks to a [`PositionProvider`] behind a trait so that platform
//! backends (and test doubles) are interchangeable. The shipped provider
//! resolves an approximate position via IP lookup.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::types::LocationError;

/// Default IP geolocation endpoint.
pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// A resolved device position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
}

/// Acquisition settings, mirroring the platform geolocation knobs.
#[derive(Debug, Clone, Copy)]
pub struct GeolocationOptions {
    /// Ask the backend for its most precise mode.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// A fix no older than this may be served from cache.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

/// Source of device positions.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Whether this provider can deliver positions at all. A `false` here is
    /// reported to the user immediately, without an acquisition attempt.
    fn is_available(&self) -> bool {
        true
    }

    /// Acquire the current position, honoring the timeout and cache budget
    /// in `options`.
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<PositionFix, LocationError>;
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate positioning via IP lookup.
///
/// `high_accuracy` has no effect here; the service resolves to city-level
/// precision regardless. Successful fixes are cached and re-served within
/// the `maximum_age` window.
pub struct IpLookupProvider {
    client: reqwest::Client,
    endpoint: String,
    last_fix: Mutex<Option<(Instant, PositionFix)>>,
}

impl std::fmt::Debug for IpLookupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpLookupProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl IpLookupProvider {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            last_fix: Mutex::new(None),
        })
    }

    fn cached_fix(&self, maximum_age: Duration) -> Option<PositionFix> {
        let guard = self.last_fix.lock();
        let (at, fix) = guard.as_ref()?;
        if at.elapsed() <= maximum_age {
            Some(fix.clone())
        } else {
            None
        }
    }

    async fn lookup(&self) -> Result<PositionFix, LocationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable);
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::Unavailable);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(PositionFix {
                latitude,
                longitude,
                accuracy_m: None,
            }),
            _ => Err(LocationError::Unavailable),
        }
    }
}

#[async_trait]
impl PositionProvider for IpLookupProvider {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<PositionFix, LocationError> {
        if let Some(fix) = self.cached_fix(options.maximum_age) {
            tracing::debug!("Serving position fix from cache");
            return Ok(fix);
        }

        let fix = tokio::time::timeout(options.timeout, self.lookup())
            .await
            .map_err(|_| LocationError::Timeout)??;

        tracing::info!(
            lat = fix.latitude,
            lon = fix.longitude,
            "Resolved position via IP lookup"
        );
        *self.last_fix.lock() = Some((Instant::now(), fix.clone()));
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "status": "success",
            "lat": 50.9375,
            "lon": 6.9603,
            "city": "Köln"
        })
    }

    #[tokio::test]
    async fn test_lookup_returns_fix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let provider = IpLookupProvider::new(server.uri()).unwrap();
        let fix = provider
            .current_position(&GeolocationOptions::default())
            .await
            .unwrap();
        assert_eq!(fix.latitude, 50.9375);
        assert_eq!(fix.longitude, 6.9603);
    }

    #[tokio::test]
    async fn test_fix_is_cached_within_maximum_age() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = IpLookupProvider::new(server.uri()).unwrap();
        let options = GeolocationOptions::default();
        let first = provider.current_position(&options).await.unwrap();
        let second = provider.current_position(&options).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failure_status_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "fail"})),
            )
            .mount(&server)
            .await;

        let provider = IpLookupProvider::new(server.uri()).unwrap();
        let err = provider
            .current_position(&GeolocationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Unavailable);
    }

    #[tokio::test]
    async fn test_slow_lookup_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = IpLookupProvider::new(server.uri()).unwrap();
        let options = GeolocationOptions {
            timeout: Duration::from_millis(50),
            ..GeolocationOptions::default()
        };
        let err = provider.current_position(&options).await.unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }
}
