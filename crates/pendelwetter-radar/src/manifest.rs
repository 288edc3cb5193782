//! Radar frame manifest: fetch and wire types.

use pendelwetter_core::{NetworkError, ReqwestErrorExt};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One radar snapshot: a timestamp and the tile-path segment used to build
/// overlay URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RadarFrame {
    /// Epoch seconds.
    pub time: i64,
    pub path: String,
}

/// The manifest as served by the radar-tile host. `past` followed by
/// `nowcast` is a single chronologically ordered sequence; the boundary
/// index `past.len()` is the present moment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadarManifest {
    #[serde(default)]
    pub past: Vec<RadarFrame>,
    #[serde(default)]
    pub nowcast: Vec<RadarFrame>,
}

impl RadarManifest {
    pub fn frame_count(&self) -> usize {
        self.past.len() + self.nowcast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }
}

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Manifest endpoint returned status {status}")]
    Status { status: u16 },

    #[error("Malformed manifest: {0}")]
    Parse(String),
}

impl RadarError {
    /// User-facing message for the radar view's error banner.
    pub fn user_message(&self) -> &'static str {
        "Radardaten konnten nicht geladen werden."
    }
}

/// Client for the radar manifest endpoint.
#[derive(Debug, Clone)]
pub struct RadarClient {
    client: reqwest::Client,
    manifest_url: String,
}

impl RadarClient {
    pub fn new(manifest_url: impl Into<String>) -> Result<Self, RadarError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RadarError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            manifest_url: manifest_url.into(),
        })
    }

    /// Fetch and parse the manifest. Safe to call repeatedly.
    pub async fn fetch_manifest(&self) -> Result<RadarManifest, RadarError> {
        let response = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .map_err(|e| RadarError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadarError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RadarError::Network(e.into_network_error()))?;

        let manifest: RadarManifest =
            serde_json::from_str(&body).map_err(|e| RadarError::Parse(e.to_string()))?;

        tracing::debug!(
            past = manifest.past.len(),
            nowcast = manifest.nowcast.len(),
            "Fetched radar manifest"
        );
        Ok(manifest)
    }
}
