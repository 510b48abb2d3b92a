use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::config::DeviceConfig;
use crate::error::AgentError;

/// Where device configuration comes from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self, device_id: &str) -> Result<DeviceConfig, AgentError>;
}

/// Fetches configuration from the IoT Center registry with a single GET.
/// Retries are the caller's business.
pub struct RegistryClient {
    base_url: String,
    client: reqwest::Client,
}

impl RegistryClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn config_url(&self, device_id: &str) -> String {
        format!("{}/api/env/{}", self.base_url, device_id)
    }
}

#[async_trait]
impl ConfigSource for RegistryClient {
    async fn fetch(&self, device_id: &str) -> Result<DeviceConfig, AgentError> {
        let url = self.config_url(device_id);
        debug!(%url, "requesting configuration");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AgentError::ConfigFetchFailed(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ConfigFetchFailed(format!(
                "[HTTP - {}]: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AgentError::ConfigFetchFailed(format!("{url}: {e}")))?;

        DeviceConfig::from_json(&body)
    }
}
