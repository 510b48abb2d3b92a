use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::AgentError;

/// Operating configuration handed out by the registry for one device.
///
/// A value of this type has already passed validation: every field was
/// present and both intervals are positive.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub id: String,

    pub influx_url: String,

    pub influx_org: String,

    pub influx_token: String,

    pub influx_bucket: String,

    pub configuration_refresh: Duration,

    pub measurement_interval: Duration,

    pub default_lat: f64,

    pub default_lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawDeviceConfig {
    id: String,
    influx_url: String,
    influx_org: String,
    influx_token: String,
    influx_bucket: String,
    configuration_refresh: f64,
    measurement_interval: f64,
    default_lat: f64,
    default_lon: f64,
}

impl DeviceConfig {
    pub fn from_json(body: &[u8]) -> Result<Self, AgentError> {
        let raw: RawDeviceConfig = serde_json::from_slice(body)
            .map_err(|e| AgentError::ConfigParseFailed(e.to_string()))?;

        raw.try_into()
    }

    /// Pretty JSON for logs, with the database token masked.
    pub fn to_redacted_json(&self) -> String {
        let value = json!({
            "id": self.id,
            "influx_url": self.influx_url,
            "influx_org": self.influx_org,
            "influx_token": "***",
            "influx_bucket": self.influx_bucket,
            "configuration_refresh": self.configuration_refresh.as_secs_f64(),
            "measurement_interval": self.measurement_interval.as_secs_f64(),
            "default_lat": self.default_lat,
            "default_lon": self.default_lon,
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

impl TryFrom<RawDeviceConfig> for DeviceConfig {
    type Error = AgentError;

    fn try_from(raw: RawDeviceConfig) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(AgentError::ConfigParseFailed("id must not be empty".to_string()));
        }

        if raw.influx_url.trim().is_empty() {
            return Err(AgentError::ConfigParseFailed(
                "influx_url must not be empty".to_string(),
            ));
        }

        if raw.influx_bucket.trim().is_empty() {
            return Err(AgentError::ConfigParseFailed(
                "influx_bucket must not be empty".to_string(),
            ));
        }

        let configuration_refresh =
            positive_seconds("configuration_refresh", raw.configuration_refresh)?;
        let measurement_interval =
            positive_seconds("measurement_interval", raw.measurement_interval)?;

        Ok(DeviceConfig {
            id: raw.id,
            influx_url: raw.influx_url,
            influx_org: raw.influx_org,
            influx_token: raw.influx_token,
            influx_bucket: raw.influx_bucket,
            configuration_refresh,
            measurement_interval,
            default_lat: raw.default_lat,
            default_lon: raw.default_lon,
        })
    }
}

fn positive_seconds(field: &str, secs: f64) -> Result<Duration, AgentError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(AgentError::ConfigParseFailed(format!(
            "{field} must be a positive number of seconds, got {secs}"
        )));
    }

    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|e| AgentError::ConfigParseFailed(format!("{field}: {e}")))?;

    // Values below one nanosecond round down to zero.
    if duration.is_zero() {
        return Err(AgentError::ConfigParseFailed(format!(
            "{field} must be at least one nanosecond, got {secs}"
        )));
    }

    Ok(duration)
}
