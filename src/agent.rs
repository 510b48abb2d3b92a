use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::cache::ConfigCache;
use crate::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::config::DeviceConfig;
use crate::database::DatabaseManager;
use crate::error::AgentError;
use crate::geo::{FixedGeoLocator, GeoLocation, GeoLocator};
use crate::point::PointBuilder;
use crate::registry::ConfigSource;
use crate::sensor::{Sensor, StubSensor};

pub const DEFAULT_FALLBACK_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_DEVICE_TAG: &str = "raspberrypi";

/// What one pass of the control loop did.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    /// `None` when the cached configuration was still fresh; otherwise
    /// whether the fetched configuration changed the cache.
    pub refresh: Option<Result<bool, AgentError>>,

    /// `None` when there was no configuration to emit with.
    pub write: Option<Result<(), AgentError>>,

    pub sleep: Duration,
}

/// The control loop: refresh configuration, emit one point, sleep.
///
/// Recoverable errors are logged and reported in [`Iteration`]; none of
/// them stop the loop.
pub struct Agent {
    device_id: String,
    fallback_interval: Duration,
    iteration: u64,
    cache: ConfigCache,
    database: DatabaseManager,
    registry: Box<dyn ConfigSource>,
    sensor: Box<dyn Sensor>,
    geo: Box<dyn GeoLocator>,
    builder: PointBuilder,
    clock: Box<dyn Clock>,
    sleeper: Box<dyn Sleeper>,
}

impl Agent {
    pub fn new(
        device_id: impl Into<String>,
        registry: Box<dyn ConfigSource>,
        database: DatabaseManager,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            fallback_interval: DEFAULT_FALLBACK_INTERVAL,
            iteration: 0,
            cache: ConfigCache::new(),
            database,
            registry,
            sensor: Box::new(StubSensor),
            geo: Box::new(FixedGeoLocator),
            builder: PointBuilder::new(DEFAULT_DEVICE_TAG),
            clock: Box::new(SystemClock),
            sleeper: Box::new(TokioSleeper),
        }
    }

    pub fn with_sensor(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_geo(mut self, geo: Box<dyn GeoLocator>) -> Self {
        self.geo = geo;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_fallback_interval(mut self, interval: Duration) -> Self {
        self.fallback_interval = interval;
        self
    }

    pub fn with_device_tag(mut self, device: &str) -> Self {
        self.builder = PointBuilder::new(device);
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.cache.current()
    }

    pub fn config_received_at(&self) -> Option<DateTime<Utc>> {
        self.cache.received_at()
    }

    pub fn is_connected(&self) -> bool {
        self.database.is_connected()
    }

    /// Runs until the surrounding task is dropped.
    pub async fn run(&mut self) {
        info!(device_id = %self.device_id, "starting agent");

        loop {
            self.step().await;
        }
    }

    /// One iteration followed by its sleep.
    pub async fn step(&mut self) -> Iteration {
        let iteration = self.tick().await;
        self.sleeper.sleep(iteration.sleep).await;
        iteration
    }

    /// One iteration without the trailing sleep.
    pub async fn tick(&mut self) -> Iteration {
        self.iteration += 1;
        let now = self.clock.now();

        let refresh = if self.cache.should_refresh(now) {
            let result = self.refresh(now).await;
            if let Err(err) = &result {
                error!(kind = err.kind(), "configuration failed: {err}");
            }
            Some(result)
        } else {
            debug!("configuration is fresh");
            None
        };

        let write = self.emit().await;
        match &write {
            Some(Err(err)) => error!(kind = err.kind(), "write failed: {err}"),
            Some(Ok(())) => {}
            None => warn!("no configuration yet, skipping measurement"),
        }

        let sleep = self
            .cache
            .current()
            .map(|config| config.measurement_interval)
            .unwrap_or(self.fallback_interval);
        debug!(iteration = self.iteration, ?sleep, "iteration done");

        Iteration {
            refresh,
            write,
            sleep,
        }
    }

    /// Releases the database connection. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.database.close().await;
        info!("agent stopped");
    }

    async fn refresh(&mut self, now: DateTime<Utc>) -> Result<bool, AgentError> {
        let candidate = self.registry.fetch(&self.device_id).await?;

        if !self.cache.apply(candidate, now) {
            debug!("configuration unchanged");
            return Ok(false);
        }

        if let Some(config) = self.cache.current() {
            info!("received configuration: {}", config.to_redacted_json());
            self.database.ensure(config)?;
        }

        Ok(true)
    }

    async fn emit(&mut self) -> Option<Result<(), AgentError>> {
        let config = self.cache.current()?;

        // A connection that failed to open on change gets another chance here.
        if !self.database.is_connected()
            && let Err(err) = self.database.ensure(config)
        {
            return Some(Err(err));
        }

        let readings = self.sensor.read();
        let fallback = GeoLocation {
            latitude: config.default_lat,
            longitude: config.default_lon,
        };
        let geo = self.geo.locate(fallback).await;
        let point = self.builder.build(config, &readings, &geo, self.clock.now());

        info!("writing: {}", point.to_line_protocol());
        Some(self.database.write(&config.influx_bucket, &point).await)
    }
}
