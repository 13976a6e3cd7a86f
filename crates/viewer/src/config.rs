use std::env;
use std::path::Path;

use engine::Camera;
use foundation::LngLat;
use listings::LocaleFilter;
use matching::MatchConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Parse(String),
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// What a click on empty ground (no building, no marker) does.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyClickPolicy {
    /// Keep the current selection.
    #[default]
    Sticky,
    /// Publish an empty selection at the click point and clear highlights.
    Clear,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub center: LngLat,
    pub zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            center: LngLat::new(32.8552, 39.8472),
            zoom: 15.0,
        }
    }
}

impl From<CameraConfig> for Camera {
    fn from(c: CameraConfig) -> Self {
        Camera::new(c.center, c.zoom)
    }
}

/// Viewer settings. Every field has a default; a TOML file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub style_url: String,
    pub camera: CameraConfig,
    pub locale: LocaleFilter,
    pub api_base_url: String,
    pub fetch_debounce_ms: u64,
    pub recolor_debounce_ms: u64,
    pub matching: MatchConfig,
    pub marker_radius_px: f64,
    pub empty_click: EmptyClickPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            style_url: "mapbox://styles/mapbox/streets-v11".to_string(),
            camera: CameraConfig::default(),
            locale: LocaleFilter::default(),
            api_base_url: "http://localhost:3000".to_string(),
            fetch_debounce_ms: 800,
            recolor_debounce_ms: 100,
            matching: MatchConfig::default(),
            marker_radius_px: 8.0,
            empty_click: EmptyClickPolicy::Sticky,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, then applies `ESTATE_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ViewerConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ViewerConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Supported variables:
    /// - `ESTATE_STYLE_URL` -> `style_url`
    /// - `ESTATE_API_BASE_URL` -> `api_base_url`
    /// - `ESTATE_CITY`, `ESTATE_DISTRICT`, `ESTATE_NEIGHBORHOOD` -> `locale.*`
    /// - `ESTATE_FETCH_DEBOUNCE_MS`, `ESTATE_RECOLOR_DEBOUNCE_MS`
    /// - `ESTATE_EMPTY_CLICK` (`sticky` | `clear`)
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ESTATE_STYLE_URL") {
            self.style_url = v;
        }
        if let Some(v) = lookup("ESTATE_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("ESTATE_CITY") {
            self.locale.city = v;
        }
        if let Some(v) = lookup("ESTATE_DISTRICT") {
            self.locale.district = v;
        }
        if let Some(v) = lookup("ESTATE_NEIGHBORHOOD") {
            self.locale.neighborhood = v;
        }
        if let Some(ms) = lookup("ESTATE_FETCH_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.fetch_debounce_ms = ms;
        }
        if let Some(ms) = lookup("ESTATE_RECOLOR_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.recolor_debounce_ms = ms;
        }
        if let Some(v) = lookup("ESTATE_EMPTY_CLICK") {
            match v.to_lowercase().as_str() {
                "sticky" => self.empty_click = EmptyClickPolicy::Sticky,
                "clear" => self.empty_click = EmptyClickPolicy::Clear,
                other => tracing::warn!(value = other, "ignoring unknown ESTATE_EMPTY_CLICK"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.style_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("style_url is empty".to_string()));
        }
        if !(self.marker_radius_px.is_finite() && self.marker_radius_px > 0.0) {
            return Err(ConfigError::InvalidValue(
                "marker_radius_px must be positive".to_string(),
            ));
        }
        let m = &self.matching;
        if !(m.radius_deg > 0.0 && m.building_threshold_deg > 0.0 && m.probe_buffer_px >= 0.0) {
            return Err(ConfigError::InvalidValue(
                "matching distances must be positive".to_string(),
            ));
        }
        if m.fallback_count == 0 {
            return Err(ConfigError::InvalidValue(
                "matching.fallback_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
