//! Error types for geocoding and weather lookups.

use thiserror::Error;

/// Errors that can occur when resolving a city or fetching its weather.
#[derive(Error, Debug)]
pub enum AmapError {
    /// Network/connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-success HTTP status or error payload from the AMap API
    #[error("API error: {0}")]
    ApiError(String),

    /// Response body did not match the expected shape
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The geocoding service answered but matched nothing
    #[error("no match found for '{0}'")]
    NoMatch(String),

    /// The weather service returned no live record for a resolved city
    #[error("no live weather available for '{0}'")]
    NoWeather(String),
}
