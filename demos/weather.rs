//! Weather lookup example.
//!
//! Run with: cargo run --example weather
//!
//! Requires: AMAP_KEY environment variable

use amap_weather::{AmapConfig, WeatherClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AmapConfig::new(std::env::var("AMAP_KEY")?);
    let mut weather = WeatherClient::new(&config);

    // 1. Detailed report for a Chinese city
    println!("{}", weather.report("深圳").await?);
    println!("{}", "-".repeat(60));

    // 2. One-line brief
    println!("{}", weather.brief("深圳").await?);
    println!("{}", "-".repeat(60));

    // 3. A city the geocoder cannot resolve (AMap covers Chinese cities only)
    match weather.brief("New York").await {
        Ok(line) => println!("{line}"),
        Err(e) => println!("lookup failed as expected: {e}"),
    }

    Ok(())
}
