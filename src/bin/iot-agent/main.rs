mod args;

use std::{env, process::ExitCode, time::Duration};

use anyhow::{Context as _, Result};
use args::{Args, SensorKind};
use clap::Parser as _;
use iot_center_agent::{
    agent::Agent,
    database::DatabaseManager,
    geo::{FixedGeoLocator, GeoLocator, HttpGeoLocator},
    identity::resolve_device_id,
    influx::InfluxConnector,
    registry::RegistryClient,
    sensor::{IioSensor, Sensor, StubSensor},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let legacy_device_id = env::var("DEVICE_ID").ok();
    let device_id = resolve_device_id(
        args.device_id.as_deref(),
        legacy_device_id.as_deref(),
        args.generate_device_id,
    )
    .context("failed to resolve device identity")?;

    let timeout = Duration::from_secs(args.http_timeout);
    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let registry = RegistryClient::new(&args.iot_center_url, http.clone());

    let sensor: Box<dyn Sensor> = match args.sensor {
        SensorKind::Stub => Box::new(StubSensor),
        SensorKind::Iio => Box::new(IioSensor::new(&args.iio_device)),
    };

    let geo: Box<dyn GeoLocator> = if args.no_geo {
        Box::new(FixedGeoLocator)
    } else {
        Box::new(HttpGeoLocator::new(&args.geo_url, http))
    };

    let database = DatabaseManager::new(Box::new(InfluxConnector::new(timeout)));

    let mut agent = Agent::new(device_id, Box::new(registry), database)
        .with_sensor(sensor)
        .with_geo(geo)
        .with_fallback_interval(Duration::from_secs(args.fallback_interval))
        .with_device_tag(&args.device_tag);

    info!(
        registry = %args.iot_center_url,
        sensor = ?args.sensor,
        "device {} bootstrapped",
        agent.device_id()
    );

    let signal = tokio::select! {
        _ = agent.run() => Ok(()),
        result = shutdown_signal() => result,
    };

    info!("shutting down");
    agent.shutdown().await;

    signal.context("failed to listen for shutdown signal")
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
