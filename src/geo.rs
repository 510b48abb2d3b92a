use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_GEO_URL: &str = "https://freegeoip.app/json/";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Device location lookup. Never fails: `fallback` is returned when the
/// lookup cannot be completed.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self, fallback: GeoLocation) -> GeoLocation;
}

/// Always answers with the configured default location.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedGeoLocator;

#[async_trait]
impl GeoLocator for FixedGeoLocator {
    async fn locate(&self, fallback: GeoLocation) -> GeoLocation {
        fallback
    }
}

/// IP geolocation over HTTP, answering `{"latitude": .., "longitude": ..}`.
pub struct HttpGeoLocator {
    url: String,
    client: reqwest::Client,
}

impl HttpGeoLocator {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }

    async fn lookup(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to request {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "[HTTP - {}]: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
        }

        response
            .json::<GeoLocation>()
            .await
            .context("failed to decode geolocation response")
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn locate(&self, fallback: GeoLocation) -> GeoLocation {
        match self.lookup().await {
            Ok(location) => location,
            Err(err) => {
                warn!("geolocation lookup failed, using configured default: {err:#}");
                fallback
            }
        }
    }
}
