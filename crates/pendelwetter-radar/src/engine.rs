//! The radar engine: fetch lifecycle, playback timer, and the read-side of
//! the shared location store.
//!
//! The engine never writes location state; on user request it delegates to
//! [`LocationStore::update_from_gps`] and picks up the new coordinates on the
//! next tile lookup.

use parking_lot::Mutex;
use pendelwetter_core::RadarConfig;
use pendelwetter_location::LocationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::manifest::{RadarClient, RadarError, RadarFrame};
use crate::tile::{map_tile_url, radar_tile_url, tile_at, TileCoordinate};
use crate::timeline::Timeline;

#[derive(Debug, Default)]
struct EngineState {
    timeline: Option<Timeline>,
    fetch_error: Option<String>,
    loading: bool,
}

/// Point-in-time view of the engine for the presentation layer.
///
/// `timeline` stays populated after a failed re-fetch: stale frames remain
/// displayable while `fetch_error` carries the message.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub timeline: Option<Timeline>,
    pub fetch_error: Option<String>,
    pub loading: bool,
}

pub struct RadarEngine {
    client: RadarClient,
    location: Arc<LocationStore>,
    state: Arc<Mutex<EngineState>>,
    ticker: Mutex<Option<CancellationToken>>,
    zoom: u8,
    step_minutes: i64,
    interval: Duration,
    radar_tile_host: String,
    map_tile_host: String,
}

impl std::fmt::Debug for RadarEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarEngine")
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

impl RadarEngine {
    pub fn new(config: &RadarConfig, location: Arc<LocationStore>) -> Result<Self, RadarError> {
        Ok(Self {
            client: RadarClient::new(config.manifest_url.as_str())?,
            location,
            state: Arc::new(Mutex::new(EngineState {
                timeline: None,
                fetch_error: None,
                loading: true,
            })),
            ticker: Mutex::new(None),
            zoom: config.zoom,
            step_minutes: config.frame_step_minutes,
            interval: Duration::from_millis(config.playback_interval_ms),
            radar_tile_host: config.radar_tile_host.clone(),
            map_tile_host: config.map_tile_host.clone(),
        })
    }

    /// Fetch the manifest and rebuild the timeline.
    ///
    /// On failure the error is recorded as data; frames from a previous
    /// successful load are kept displayable.
    pub async fn refresh(&self) {
        self.stop_ticker();
        self.state.lock().loading = true;

        match self.client.fetch_manifest().await {
            Ok(manifest) => {
                let timeline = Timeline::from_manifest(&manifest, self.step_minutes);
                let mut state = self.state.lock();
                state.timeline = Some(timeline);
                state.fetch_error = None;
                state.loading = false;
            }
            Err(e) => {
                tracing::warn!("Radar manifest fetch failed: {}", e);
                let mut state = self.state.lock();
                // The ticker is gone; the retained timeline must not claim
                // to be playing.
                if let Some(timeline) = state.timeline.as_mut() {
                    timeline.pause();
                }
                state.fetch_error = Some(e.user_message().to_string());
                state.loading = false;
            }
        }
    }

    /// Snapshot for rendering.
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.lock();
        EngineSnapshot {
            timeline: state.timeline.clone(),
            fetch_error: state.fetch_error.clone(),
            loading: state.loading,
        }
    }

    /// Flip play/pause, starting or stopping the 500 ms ticker.
    pub fn toggle_play(&self) {
        let playing = {
            let mut state = self.state.lock();
            let Some(timeline) = state.timeline.as_mut() else {
                return;
            };
            timeline.toggle_play();
            timeline.is_playing()
        };

        if playing {
            self.start_ticker();
        } else {
            self.stop_ticker();
        }
    }

    /// Scrub to an absolute frame index.
    pub fn scrub(&self, index: usize) {
        if let Some(timeline) = self.state.lock().timeline.as_mut() {
            timeline.scrub(index);
        }
    }

    /// Quick-select jump; pauses playback.
    pub fn jump_to_offset(&self, minutes: i64) {
        if let Some(timeline) = self.state.lock().timeline.as_mut() {
            timeline.jump_to_offset(minutes);
        }
        self.stop_ticker();
    }

    /// Re-acquire the device position through the shared store.
    pub async fn refresh_location(&self) {
        self.location.update_from_gps().await;
    }

    /// Tile index for the current shared location, `None` until located.
    pub fn tile_for_current_location(&self) -> Option<TileCoordinate> {
        let (lat, lon) = self.location.state().coordinates()?;
        Some(tile_at(lat, lon, self.zoom))
    }

    /// Overlay tile URL for one frame at the current location.
    pub fn overlay_url(&self, frame: &RadarFrame) -> Option<String> {
        let tile = self.tile_for_current_location()?;
        Some(radar_tile_url(&self.radar_tile_host, &frame.path, tile))
    }

    /// Base map tile URL for the current location.
    pub fn base_map_url(&self) -> Option<String> {
        let tile = self.tile_for_current_location()?;
        Some(map_tile_url(&self.map_tile_host, tile))
    }

    fn start_ticker(&self) {
        let token = CancellationToken::new();
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let mut state = state.lock();
                        match state.timeline.as_mut() {
                            Some(timeline) if timeline.is_playing() => timeline.tick(),
                            _ => break,
                        }
                    }
                }
            }
        });

        // Replacing an old token cancels the previous task.
        if let Some(previous) = self.ticker.lock().replace(token) {
            previous.cancel();
        }
    }

    fn stop_ticker(&self) {
        if let Some(token) = self.ticker.lock().take() {
            token.cancel();
        }
    }
}

impl Drop for RadarEngine {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
