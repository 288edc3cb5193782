//! The Location Store.
//!
//! Exactly one instance exists per running application; every view observes
//! the same `Arc<LocationStore>`. All mutation goes through
//! [`LocationStore::update_from_gps`], [`LocationStore::update_manual`] and
//! [`LocationStore::clear_error`]; readers get whole-state snapshots and can
//! never observe a half-updated record.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::geocode::{Geocoder, FALLBACK_LABEL};
use crate::geolocate::{GeolocationOptions, PositionProvider};
use crate::storage::LocationStorage;
use crate::types::{LocationError, LocationSource, LocationState};

#[derive(Debug, Default)]
struct Inner {
    state: LocationState,
    loading: bool,
    error: Option<LocationError>,
}

pub struct LocationStore {
    inner: Mutex<Inner>,
    storage: LocationStorage,
    provider: Arc<dyn PositionProvider>,
    geocoder: Geocoder,
    options: GeolocationOptions,
}

impl std::fmt::Debug for LocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl LocationStore {
    /// Open the store, rehydrating the last persisted state if one exists.
    pub fn open(
        storage: LocationStorage,
        provider: Arc<dyn PositionProvider>,
        geocoder: Geocoder,
        options: GeolocationOptions,
    ) -> Self {
        let state = storage.load_state().unwrap_or_default();
        if let Some((lat, lon)) = state.coordinates() {
            tracing::info!(lat, lon, label = %state.city_label, "Rehydrated location");
        }
        Self {
            inner: Mutex::new(Inner {
                state,
                loading: false,
                error: None,
            }),
            storage,
            provider,
            geocoder,
            options,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LocationState {
        self.inner.lock().state.clone()
    }

    /// Whether a GPS acquisition (including its geocoding sub-call) is in
    /// flight.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    /// The last acquisition error, if any.
    pub fn error(&self) -> Option<LocationError> {
        self.inner.lock().error.clone()
    }

    /// Acquire the device position and replace the state.
    ///
    /// Never returns an error: failures are mapped into the error field and
    /// leave the state untouched.
    pub async fn update_from_gps(&self) {
        if !self.provider.is_available() {
            tracing::warn!("No position capability available");
            self.inner.lock().error = Some(LocationError::Unavailable);
            return;
        }

        self.inner.lock().loading = true;

        let result = self.provider.current_position(&self.options).await;
        match result {
            Ok(fix) => {
                let label = self
                    .geocoder
                    .reverse(fix.latitude, fix.longitude)
                    .await
                    .unwrap_or_else(|| FALLBACK_LABEL.to_string());

                let state = LocationState::located(
                    fix.latitude,
                    fix.longitude,
                    label,
                    LocationSource::Gps,
                    now_ms(),
                );
                self.replace(state);
            }
            Err(e) => {
                tracing::warn!("Position acquisition failed: {}", e);
                let mut inner = self.inner.lock();
                inner.error = Some(e);
                inner.loading = false;
            }
        }
    }

    /// Replace the state from manual entry. Synchronous, no network.
    pub fn update_manual(&self, lat: f64, lon: f64, label: impl Into<String>) {
        let state = LocationState::located(lat, lon, label, LocationSource::Manual, now_ms());
        self.replace(state);
    }

    /// Clear the error field only; the location is untouched.
    pub fn clear_error(&self) {
        self.inner.lock().error = None;
    }

    fn replace(&self, state: LocationState) {
        {
            let mut inner = self.inner.lock();
            inner.state = state.clone();
            inner.error = None;
            inner.loading = false;
        }

        // Best-effort persistence; a write failure must not disturb the
        // in-memory state.
        if let Err(e) = self.storage.persist_state(&state) {
            tracing::warn!("Failed to persist location: {}", e);
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
