//! Weather lookups keyed by the resolver cache.
//!
//! The AMap weather endpoint answers by region code, so every query goes
//! through [`CityResolver`] first. `extensions=base` returns the live
//! record, `extensions=all` the daily forecasts.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::{
    config::AmapConfig,
    error::AmapError,
    geocode::{AmapGeocoder, RegionLookup},
    resolver::CityResolver,
};

/// How many forecast days a report includes at most.
const FORECAST_DAYS: usize = 3;

/// Weather client for the AMap REST API.
pub struct WeatherClient<L> {
    client: Client,
    key: String,
    url: String,
    timeout: Duration,
    resolver: CityResolver<L>,
}

impl WeatherClient<AmapGeocoder> {
    /// Create a weather client resolving cities through the AMap geocoder.
    #[must_use]
    pub fn new(config: &AmapConfig) -> Self {
        Self::with_lookup(config, AmapGeocoder::new(config))
    }
}

impl<L: RegionLookup> WeatherClient<L> {
    /// Create a weather client with a custom region lookup.
    #[must_use]
    pub fn with_lookup(config: &AmapConfig, lookup: L) -> Self {
        Self {
            client: Client::new(),
            key: config.key.clone(),
            url: config.weather_url.clone(),
            timeout: config.timeout,
            resolver: CityResolver::open(&config.cache_path, lookup),
        }
    }

    /// Detailed report: live conditions plus up to three forecast days.
    ///
    /// # Errors
    ///
    /// Propagates resolver errors for unknown cities and returns
    /// [`AmapError::NoWeather`] when the service has no live record.
    #[instrument(skip(self))]
    pub async fn report(&mut self, city: &str) -> Result<String, AmapError> {
        let code = self.resolver.resolve(city).await?;

        let response = self.fetch(&code, "base").await?;
        let live = first_live(city, response)?;

        // Forecasts come from a separate extensions=all query.
        let forecast = self.fetch(&code, "all").await?;
        let casts = forecast
            .forecasts
            .into_iter()
            .next()
            .map(|f| f.casts)
            .unwrap_or_default();

        Ok(format_report(city, &live, &casts))
    }

    /// One-line summary of the current weather.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`WeatherClient::report`].
    #[instrument(skip(self))]
    pub async fn brief(&mut self, city: &str) -> Result<String, AmapError> {
        let code = self.resolver.resolve(city).await?;

        let response = self.fetch(&code, "base").await?;
        let live = first_live(city, response)?;

        Ok(format_brief(city, &live))
    }

    async fn fetch(&self, code: &str, extensions: &str) -> Result<WeatherResponse, AmapError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("key", self.key.as_str()),
                ("city", code),
                ("extensions", extensions),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AmapError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AmapError::ApiError(format!(
                "weather endpoint returned status {}",
                response.status()
            )));
        }

        let decoded: WeatherResponse = response
            .json()
            .await
            .map_err(|e| AmapError::InvalidResponse(e.to_string()))?;

        if decoded.status != "1" {
            return Err(AmapError::ApiError(format!(
                "weather query for region {code} failed"
            )));
        }

        Ok(decoded)
    }
}

#[derive(Deserialize)]
struct WeatherResponse {
    status: String,
    #[serde(default)]
    lives: Vec<LiveWeather>,
    #[serde(default)]
    forecasts: Vec<Forecast>,
}

#[derive(Debug, Deserialize)]
struct LiveWeather {
    #[serde(default)]
    weather: String,
    #[serde(default)]
    temperature: String,
    #[serde(default)]
    humidity: String,
    #[serde(default)]
    winddirection: String,
    #[serde(default)]
    windpower: String,
    #[serde(default)]
    reporttime: String,
}

#[derive(Deserialize)]
struct Forecast {
    #[serde(default)]
    casts: Vec<Cast>,
}

#[derive(Deserialize, Clone)]
struct Cast {
    #[serde(default)]
    date: String,
    #[serde(default)]
    dayweather: String,
    #[serde(default)]
    nightweather: String,
    #[serde(default)]
    daytemp: String,
    #[serde(default)]
    nighttemp: String,
    #[serde(default)]
    daywind: String,
    #[serde(default)]
    daypower: String,
    #[serde(default)]
    nightwind: String,
    #[serde(default)]
    nightpower: String,
}

/// Pull the live record out of an `extensions=base` reply.
///
/// A successful reply can still carry no live record (AMap answers
/// `status: "1"` with an empty `lives` array for some region codes).
fn first_live(city: &str, response: WeatherResponse) -> Result<LiveWeather, AmapError> {
    response
        .lives
        .into_iter()
        .next()
        .ok_or_else(|| AmapError::NoWeather(city.to_string()))
}

fn format_report(city: &str, live: &LiveWeather, casts: &[Cast]) -> String {
    let mut report = format!(
        "City: {city}\n\
         Weather: {}\n\
         Temperature: {}°C\n\
         Humidity: {}%\n\
         Wind direction: {}\n\
         Wind power: {}\n\
         Report time: {}\n",
        live.weather,
        live.temperature,
        live.humidity,
        live.winddirection,
        live.windpower,
        live.reporttime,
    );

    if !casts.is_empty() {
        report.push_str("\nForecast:\n");
        for cast in casts.iter().take(FORECAST_DAYS) {
            report.push_str(&format!(
                "Date: {}\n\
                 Day: {}, {}°C, {} wind level {}\n\
                 Night: {}, {}°C, {} wind level {}\n",
                cast.date,
                cast.dayweather,
                cast.daytemp,
                cast.daywind,
                cast.daypower,
                cast.nightweather,
                cast.nighttemp,
                cast.nightwind,
                cast.nightpower,
            ));
        }
    }

    report
}

fn format_brief(city: &str, live: &LiveWeather) -> String {
    format!(
        "{city} current weather: {}, {}°C",
        live.weather, live.temperature
    )
}
