use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::DeviceConfig;
use crate::error::AgentError;
use crate::point::MetricPoint;

/// An open connection to the time-series database.
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Submits one point and waits until the database has accepted it.
    async fn write(&self, bucket: &str, point: &MetricPoint) -> Result<(), AgentError>;

    /// Called once before the connection is dropped.
    async fn close(&self);
}

/// Opens database connections from a device configuration.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &DeviceConfig) -> Result<Box<dyn PointSink>, AgentError>;
}

/// Owns the single database connection of the process.
///
/// The connection is opened by the first successful [`ensure`](Self::ensure)
/// and kept until [`close`](Self::close); later configurations do not
/// replace it.
pub struct DatabaseManager {
    connector: Box<dyn Connector>,
    connection: Option<Box<dyn PointSink>>,
}

impl DatabaseManager {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn ensure(&mut self, config: &DeviceConfig) -> Result<(), AgentError> {
        if self.connection.is_some() {
            debug!("database connection already established");
            return Ok(());
        }

        let connection = self.connector.connect(config)?;
        info!(
            url = %config.influx_url,
            org = %config.influx_org,
            "database connection established"
        );
        self.connection = Some(connection);

        Ok(())
    }

    pub async fn write(&self, bucket: &str, point: &MetricPoint) -> Result<(), AgentError> {
        let Some(connection) = &self.connection else {
            return Err(AgentError::WriteFailed("no database connection".to_string()));
        };

        connection.write(bucket, point).await
    }

    pub async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
            info!("database connection closed");
        }
    }
}
