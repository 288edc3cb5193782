use chrono::{DateTime, NaiveDateTime, Utc};
use pendelwetter_core::NetworkError;
use serde::{Deserialize, Serialize};

/// Sky/precipitation condition derived from WMO weather codes.
///
/// See <https://open-meteo.com/en/docs#weathervariables> for the code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    MostlyClear,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    Showers,
    Thunderstorm,
}

impl Condition {
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::MostlyClear,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 | 66 | 67 => Self::FreezingRain,
            61 | 63 | 65 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            80 | 81 | 82 => Self::Showers,
            95 | 96 | 99 => Self::Thunderstorm,
            // 3 and anything unrecognized
            _ => Self::Overcast,
        }
    }

    /// German display text.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Klar",
            Self::MostlyClear => "Überwiegend klar",
            Self::Overcast => "Bedeckt",
            Self::Fog => "Nebel",
            Self::Drizzle => "Nieselregen",
            Self::Rain => "Regen",
            Self::FreezingRain => "Gefrierender Regen",
            Self::Snow => "Schnee",
            Self::Showers => "Schauer",
            Self::Thunderstorm => "Gewitter",
        }
    }

    /// Whether the condition means getting wet on the way.
    pub fn is_wet(&self) -> bool {
        matches!(
            self,
            Self::Drizzle
                | Self::Rain
                | Self::FreezingRain
                | Self::Snow
                | Self::Showers
                | Self::Thunderstorm
        )
    }
}

/// Current conditions at the user's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub condition: Condition,
    pub fetched_at: DateTime<Utc>,
}

/// One hour of the forecast series, in the location's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSample {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability: Option<u8>,
    pub condition: Condition,
}

/// Everything the now/commute views need from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentWeather,
    pub hours: Vec<HourSample>,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Forecast endpoint returned status {status}")]
    Status { status: u16 },

    #[error("Malformed forecast: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(e) => e.user_message(),
            WeatherError::Status { .. } | WeatherError::Parse(_) => {
                "Wetterdaten konnten nicht geladen werden."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_codes() {
        assert_eq!(Condition::from_wmo_code(0), Condition::Clear);
        assert_eq!(Condition::from_wmo_code(1), Condition::MostlyClear);
        assert_eq!(Condition::from_wmo_code(2), Condition::MostlyClear);
        assert_eq!(Condition::from_wmo_code(3), Condition::Overcast);
    }

    #[test]
    fn test_precipitation_codes_are_wet() {
        for code in [51, 55, 61, 65, 66, 71, 80, 82, 95, 99] {
            assert!(
                Condition::from_wmo_code(code).is_wet(),
                "code {} should be wet",
                code
            );
        }
    }

    #[test]
    fn test_dry_codes_are_not_wet() {
        for code in [0, 1, 2, 3, 45, 48] {
            assert!(!Condition::from_wmo_code(code).is_wet());
        }
    }

    #[test]
    fn test_unknown_code_defaults_to_overcast() {
        assert_eq!(Condition::from_wmo_code(999), Condition::Overcast);
        assert_eq!(Condition::from_wmo_code(-1), Condition::Overcast);
    }

    #[test]
    fn test_descriptions_are_german() {
        assert_eq!(Condition::Rain.description(), "Regen");
        assert_eq!(Condition::Thunderstorm.description(), "Gewitter");
    }
}
