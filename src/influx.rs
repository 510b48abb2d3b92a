use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::DeviceConfig;
use crate::database::{Connector, PointSink};
use crate::error::AgentError;
use crate::point::MetricPoint;

/// Opens [`InfluxClient`]s against the InfluxDB v2 HTTP API.
#[derive(Debug, Clone)]
pub struct InfluxConnector {
    timeout: Duration,
}

impl InfluxConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for InfluxConnector {
    fn connect(&self, config: &DeviceConfig) -> Result<Box<dyn PointSink>, AgentError> {
        let mut auth = HeaderValue::from_str(&format!("Token {}", config.influx_token))
            .map_err(|e| AgentError::ConnectionFailed(format!("invalid influx_token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AgentError::ConnectionFailed(e.to_string()))?;

        Ok(Box::new(InfluxClient {
            write_url: format!("{}/api/v2/write", config.influx_url.trim_end_matches('/')),
            org: config.influx_org.clone(),
            client,
        }))
    }
}

/// Unbatched writer: every point is one request.
pub struct InfluxClient {
    write_url: String,
    org: String,
    client: reqwest::Client,
}

#[async_trait]
impl PointSink for InfluxClient {
    async fn write(&self, bucket: &str, point: &MetricPoint) -> Result<(), AgentError> {
        let line = point.to_line_protocol();

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", bucket),
                ("precision", "ns"),
            ])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await
            .map_err(|e| AgentError::WriteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::WriteFailed(format!(
                "[HTTP - {}]: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        Ok(())
    }

    async fn close(&self) {
        debug!(url = %self.write_url, "releasing influx client");
    }
}
