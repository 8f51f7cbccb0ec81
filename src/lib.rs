//! # amap-weather
//!
//! City geocoding and weather lookups backed by the AMap REST API, built
//! for tool use by local LLM agents.
//!
//! The heart of the crate is [`CityResolver`]: a persisted name-to-adcode
//! cache that answers from a JSON file when it can and falls back to one
//! remote geocode call when it cannot. [`WeatherClient`] layers live
//! weather reports and one-line briefs on top of it, and
//! [`filter::strip_reasoning`] cleans `<think>` regions out of
//! reasoning-model output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use amap_weather::{AmapConfig, WeatherClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AmapConfig::new(std::env::var("AMAP_KEY")?);
//!     let mut weather = WeatherClient::new(&config);
//!
//!     println!("{}", weather.brief("深圳").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod geocode;
pub mod resolver;
pub mod weather;

pub use config::AmapConfig;
pub use error::AmapError;
pub use geocode::{AmapGeocoder, RegionLookup};
pub use resolver::CityResolver;
pub use weather::WeatherClient;
