//! Client configuration.
//!
//! There is no ambient default client: callers construct an [`AmapConfig`]
//! and pass it in explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default geocoding endpoint (city name to adcode).
pub const DEFAULT_GEOCODE_URL: &str = "https://restapi.amap.com/v3/geocode/geo";

/// Default weather endpoint (adcode to live/forecast weather).
pub const DEFAULT_WEATHER_URL: &str = "https://restapi.amap.com/v3/weather/weatherInfo";

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

/// Configuration for the AMap clients.
#[derive(Debug, Clone)]
pub struct AmapConfig {
    /// AMap API key.
    pub key: String,
    /// Geocoding endpoint URL.
    pub geocode_url: String,
    /// Weather endpoint URL.
    pub weather_url: String,
    /// Path of the persisted city-code cache file.
    pub cache_path: PathBuf,
    /// Request timeout for both endpoints.
    pub timeout: Duration,
}

impl AmapConfig {
    /// Create a configuration with the given API key and default endpoints.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            cache_path: PathBuf::from("city_code_cache.json"),
            timeout: default_timeout(),
        }
    }

    /// Override the geocoding endpoint URL.
    #[must_use]
    pub fn with_geocode_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_url = url.into();
        self
    }

    /// Override the weather endpoint URL.
    #[must_use]
    pub fn with_weather_url(mut self, url: impl Into<String>) -> Self {
        self.weather_url = url.into();
        self
    }

    /// Set the location of the persisted city-code cache.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl AsRef<Path>) -> Self {
        self.cache_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
