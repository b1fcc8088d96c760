use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct WeatherObservation {
    pub description: String,
    pub temp_celsius: f64,
}

/// Best-effort current-conditions lookup for a destination city. Callers
/// treat any error as "no tip this time".
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> anyhow::Result<WeatherObservation>;
}

pub struct OpenWeatherProvider {
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build weather HTTP client")?;
        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> anyhow::Result<WeatherObservation> {
        let resp = self
            .client
            .get("https://api.openweathermap.org/data/2.5/weather")
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
            .send()
            .await
            .context("failed to call weather API")?
            .error_for_status()
            .context("weather API returned error")?;

        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse weather response")?;

        let description = data["weather"][0]["description"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing weather description"))?
            .to_string();
        let temp_celsius = data["main"]["temp"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("missing temperature"))?;

        Ok(WeatherObservation {
            description,
            temp_celsius,
        })
    }
}
