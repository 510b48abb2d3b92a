use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use iot_center_agent::{agent::DEFAULT_DEVICE_TAG, geo::DEFAULT_GEO_URL, sensor::DEFAULT_IIO_DEVICE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorKind {
    /// Fixed readings, for machines without a BME280
    Stub,
    /// BME280 through the Linux IIO sysfs interface
    Iio,
}

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "IOT_CENTER_URL", default_value = "http://localhost:5000")]
    pub iot_center_url: String,

    #[arg(long, env = "IOT_DEVICE_ID")]
    pub device_id: Option<String>,

    /// Generate a random device id when none is configured
    #[arg(long, env = "IOT_GENERATE_DEVICE_ID")]
    pub generate_device_id: bool,

    #[arg(long, env = "IOT_SENSOR", value_enum, default_value_t = SensorKind::Stub)]
    pub sensor: SensorKind,

    #[arg(long, env = "IOT_IIO_DEVICE", default_value = DEFAULT_IIO_DEVICE)]
    pub iio_device: PathBuf,

    #[arg(long, env = "IOT_GEO_URL", default_value = DEFAULT_GEO_URL)]
    pub geo_url: String,

    /// Skip geolocation and report the configured default location
    #[arg(long)]
    pub no_geo: bool,

    /// Seconds to wait between attempts while no configuration exists
    #[arg(long, env = "IOT_FALLBACK_INTERVAL", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub fallback_interval: u64,

    /// Timeout in seconds for every outbound HTTP request
    #[arg(long, env = "IOT_HTTP_TIMEOUT", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub http_timeout: u64,

    #[arg(long, env = "IOT_DEVICE_TAG", default_value = DEFAULT_DEVICE_TAG)]
    pub device_tag: String,
}
