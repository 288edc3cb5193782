use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// One finding from config validation, tied to the offending field.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collected findings from [`Config::validate`].
///
/// Errors block startup; warnings are logged and the value is kept as-is.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError::new(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError::new(field, message));
    }

    /// All errors on one line, for the startup failure message.
    pub fn error_summary(&self) -> String {
        let mut parts = Vec::with_capacity(self.errors.len());
        for error in &self.errors {
            parts.push(error.to_string());
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Default starting location, used only before any GPS or manual
    /// location was ever stored
    #[serde(default)]
    pub location: DefaultLocationConfig,

    /// Radar timeline settings
    #[serde(default)]
    pub radar: RadarConfig,

    /// Weather and geocoding settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultLocationConfig {
    /// Display label for the default place
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for DefaultLocationConfig {
    fn default() -> Self {
        Self {
            label: "Berlin".to_string(),
            lat: 52.52,
            lon: 13.405,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Slippy-map zoom level for tile lookup
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Playback timer interval in milliseconds
    #[serde(default = "default_playback_interval_ms")]
    pub playback_interval_ms: u64,

    /// Minutes between consecutive radar frames (upstream manifest spacing)
    #[serde(default = "default_frame_step_minutes")]
    pub frame_step_minutes: i64,

    /// Radar frame manifest endpoint
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    /// Host serving radar overlay tiles
    #[serde(default = "default_radar_tile_host")]
    pub radar_tile_host: String,

    /// Host serving base map tiles
    #[serde(default = "default_map_tile_host")]
    pub map_tile_host: String,
}

fn default_zoom() -> u8 {
    7
}

fn default_playback_interval_ms() -> u64 {
    500
}

fn default_frame_step_minutes() -> i64 {
    10
}

fn default_manifest_url() -> String {
    "https://api.rainviewer.com/public/weather-maps.json".to_string()
}

fn default_radar_tile_host() -> String {
    "https://tilecache.rainviewer.com".to_string()
}

fn default_map_tile_host() -> String {
    "https://tile.openstreetmap.org".to_string()
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            playback_interval_ms: default_playback_interval_ms(),
            frame_step_minutes: default_frame_step_minutes(),
            manifest_url: default_manifest_url(),
            radar_tile_host: default_radar_tile_host(),
            map_tile_host: default_map_tile_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Reverse geocoding endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Language for geocoded place names
    #[serde(default = "default_language")]
    pub language: String,

    /// Refresh interval in minutes
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/reverse".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

fn default_refresh_minutes() -> u32 {
    15
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_url: default_geocoding_url(),
            language: default_language(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pendelwetter");

        Self {
            config_dir,
            location: DefaultLocationConfig::default(),
            radar: RadarConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !(-90.0..=90.0).contains(&self.location.lat) {
            result.add_error("location.lat", "Latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.location.lon) {
            result.add_error("location.lon", "Longitude must be within [-180, 180]");
        }

        if self.radar.zoom > 19 {
            result.add_error("radar.zoom", "Zoom level must be at most 19");
        }
        if self.radar.playback_interval_ms == 0 {
            result.add_error(
                "radar.playback_interval_ms",
                "Playback interval must be greater than 0",
            );
        } else if self.radar.playback_interval_ms < 100 {
            result.add_warning(
                "radar.playback_interval_ms",
                "Playback interval below 100ms will hammer the UI",
            );
        }
        if self.radar.frame_step_minutes <= 0 {
            result.add_error(
                "radar.frame_step_minutes",
                "Frame step must be greater than 0",
            );
        }

        self.validate_url(&self.radar.manifest_url, "radar.manifest_url", &mut result);
        self.validate_url(
            &self.radar.radar_tile_host,
            "radar.radar_tile_host",
            &mut result,
        );
        self.validate_url(&self.radar.map_tile_host, "radar.map_tile_host", &mut result);
        self.validate_url(
            &self.weather.forecast_url,
            "weather.forecast_url",
            &mut result,
        );
        self.validate_url(
            &self.weather.geocoding_url,
            "weather.geocoding_url",
            &mut result,
        );

        if self.weather.refresh_minutes == 0 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh disabled (0 minutes)",
            );
        } else if self.weather.refresh_minutes > 1440 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh interval is more than 24 hours",
            );
        }

        result
    }

    fn validate_url(&self, value: &str, field: &str, result: &mut ValidationResult) {
        match Url::parse(value) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(field, format!("URL must be http(s), got {}", url.scheme()));
                }
            }
            Err(e) => {
                result.add_error(field, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("pendelwetter");
        Ok(config_dir.join("config.toml"))
    }

    /// Path to the durable data directory (location storage lives here)
    pub fn data_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }
}
