//! Bare resolver example: city name to adcode, cached on disk.
//!
//! Run with: cargo run --example resolve_city -- 深圳
//!
//! Requires: AMAP_KEY environment variable

use amap_weather::{AmapConfig, AmapGeocoder, CityResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let city = std::env::args().nth(1).unwrap_or_else(|| "深圳".to_string());

    let config = AmapConfig::new(std::env::var("AMAP_KEY")?);
    let mut resolver = CityResolver::open(&config.cache_path, AmapGeocoder::new(&config));

    let code = resolver.resolve(&city).await?;
    println!("{city} -> {code}");

    // Second call is answered from the cache (watch the debug logs).
    let code = resolver.resolve(&city).await?;
    println!("{city} -> {code} (cached)");

    Ok(())
}
