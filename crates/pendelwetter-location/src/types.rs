use serde::{Deserialize, Serialize};

/// Where the current location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    #[default]
    Gps,
    Manual,
}

/// The single owned record of user position.
///
/// Replaced wholesale on every update; consumers only ever see a complete
/// snapshot. `lat` and `lon` are both present or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationState {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Human-readable place name, empty until resolved.
    #[serde(default)]
    pub city_label: String,
    #[serde(default)]
    pub source: LocationSource,
    /// Epoch milliseconds of the last replacement; 0 means never set.
    #[serde(default)]
    pub last_updated: i64,
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            lat: None,
            lon: None,
            city_label: String::new(),
            source: LocationSource::default(),
            last_updated: 0,
        }
    }
}

impl LocationState {
    /// A fully resolved state. This is the only way coordinates enter the
    /// record, which keeps the both-or-neither invariant.
    pub fn located(
        lat: f64,
        lon: f64,
        city_label: impl Into<String>,
        source: LocationSource,
        last_updated: i64,
    ) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            city_label: city_label.into(),
            source,
            last_updated,
        }
    }

    /// Both coordinates, or `None` if the location was never resolved.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Reduced record written under the legacy storage key; older consumers
/// still read this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLocationRecord {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl LegacyLocationRecord {
    pub fn from_state(state: &LocationState) -> Option<Self> {
        let (lat, lon) = state.coordinates()?;
        Some(Self {
            lat,
            lon,
            name: state.city_label.clone(),
        })
    }
}

/// Location acquisition errors, shown to the user as data rather than
/// raised as exceptions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    /// German user-facing guidance for each failure kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Standortzugriff verweigert. Bitte Berechtigung erteilen oder Ort manuell eingeben."
            }
            LocationError::Unavailable => {
                "Standort konnte nicht ermittelt werden. Bitte Ort manuell eingeben."
            }
            LocationError::Timeout => {
                "Standortermittlung hat zu lange gedauert. Bitte erneut versuchen."
            }
            LocationError::Other(_) => "Unbekannter Fehler bei der Standortermittlung.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = LocationState::default();
        assert!(state.coordinates().is_none());
        assert!(state.city_label.is_empty());
        assert_eq!(state.last_updated, 0);
    }

    #[test]
    fn test_located_state_has_both_coordinates() {
        let state = LocationState::located(50.94, 6.96, "Köln", LocationSource::Manual, 1234);
        assert_eq!(state.coordinates(), Some((50.94, 6.96)));
        assert_eq!(state.source, LocationSource::Manual);
    }

    #[test]
    fn test_state_serializes_with_camel_case_keys() {
        let state = LocationState::located(52.52, 13.405, "Berlin", LocationSource::Gps, 99);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["cityLabel"], "Berlin");
        assert_eq!(json["lastUpdated"], 99);
        assert_eq!(json["source"], "gps");
    }

    #[test]
    fn test_legacy_record_requires_coordinates() {
        assert!(LegacyLocationRecord::from_state(&LocationState::default()).is_none());

        let state = LocationState::located(48.14, 11.58, "München", LocationSource::Gps, 1);
        let legacy = LegacyLocationRecord::from_state(&state).unwrap();
        assert_eq!(legacy.name, "München");
        let json = serde_json::to_value(&legacy).unwrap();
        assert_eq!(
            json.as_object().unwrap().keys().collect::<Vec<_>>().len(),
            3
        );
    }

    #[test]
    fn test_error_messages_give_manual_entry_guidance() {
        assert!(LocationError::PermissionDenied
            .user_message()
            .contains("manuell"));
        assert!(LocationError::Unavailable.user_message().contains("manuell"));
    }
}
