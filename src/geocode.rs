//! Remote geocoding boundary.
//!
//! [`RegionLookup`] is the seam between the resolver cache and whatever
//! service actually maps a city name to a region code. [`AmapGeocoder`] is
//! the production implementation speaking the AMap geocoding REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{config::AmapConfig, error::AmapError};

/// Maps a free-text place name to a region code.
///
/// `Ok(None)` means the service answered but matched nothing; `Err` means
/// the lookup attempt itself failed.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    /// Look up the region code for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails or the response cannot be
    /// decoded.
    async fn region_code(&self, name: &str) -> Result<Option<String>, AmapError>;
}

/// Geocoding client for the AMap REST API.
pub struct AmapGeocoder {
    client: Client,
    key: String,
    url: String,
    timeout: Duration,
}

impl AmapGeocoder {
    /// Create a geocoder from the given configuration.
    #[must_use]
    pub fn new(config: &AmapConfig) -> Self {
        Self {
            client: Client::new(),
            key: config.key.clone(),
            url: config.geocode_url.clone(),
            timeout: config.timeout,
        }
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    geocodes: Vec<Geocode>,
}

#[derive(Deserialize)]
struct Geocode {
    #[serde(default)]
    adcode: String,
}

#[async_trait]
impl RegionLookup for AmapGeocoder {
    #[instrument(skip(self), fields(provider = "amap"))]
    async fn region_code(&self, name: &str) -> Result<Option<String>, AmapError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.key.as_str()), ("address", name)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AmapError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AmapError::ApiError(format!(
                "geocode endpoint returned status {}",
                response.status()
            )));
        }

        let decoded: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| AmapError::InvalidResponse(e.to_string()))?;

        // AMap signals success with status "1" and a stringly-typed count.
        if decoded.status != "1" || decoded.count.as_deref() == Some("0") {
            debug!(name, "geocode returned no match");
            return Ok(None);
        }

        // Only the first candidate is used.
        match decoded.geocodes.first() {
            Some(geocode) if !geocode.adcode.is_empty() => {
                debug!(name, adcode = %geocode.adcode, "geocode resolved");
                Ok(Some(geocode.adcode.clone()))
            }
            _ => {
                debug!(name, "geocode returned no usable candidate");
                Ok(None)
            }
        }
    }
}
