use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use tracing::warn;

use crate::sensor::{DEFAULT_HUMIDITY, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE, Sensor};

// Ref: https://www.kernel.org/doc/Documentation/ABI/testing/sysfs-bus-iio
const TEMPERATURE_FILE: &str = "in_temp_input";
const HUMIDITY_FILE: &str = "in_humidityrelative_input";
const PRESSURE_FILE: &str = "in_pressure_input";

pub const DEFAULT_IIO_DEVICE: &str = "/sys/bus/iio/devices/iio:device0";

/// BME280 exposed by the kernel `bmp280` driver through sysfs.
#[derive(Debug, Clone)]
pub struct IioSensor {
    device_dir: PathBuf,
}

impl IioSensor {
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_dir: device_dir.into(),
        }
    }

    fn read_channel(&self, file: &str, scale: f64, default: f64) -> f64 {
        match read_value(&self.device_dir.join(file)) {
            Ok(v) => v * scale,
            Err(err) => {
                warn!(channel = file, "sensor read failed, using default {default}: {err:#}");
                default
            }
        }
    }
}

fn read_value(path: &Path) -> Result<f64> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("failed to parse {}: {:?}", path.display(), raw.trim()))?;

    if !value.is_finite() {
        bail!("non-finite value in {}: {value}", path.display());
    }

    Ok(value)
}

impl Sensor for IioSensor {
    fn model(&self) -> &str {
        "bme280"
    }

    // milli-degrees Celsius
    fn temperature(&self) -> f64 {
        self.read_channel(TEMPERATURE_FILE, 0.001, DEFAULT_TEMPERATURE)
    }

    // milli-percent
    fn humidity(&self) -> f64 {
        self.read_channel(HUMIDITY_FILE, 0.001, DEFAULT_HUMIDITY)
    }

    // kilopascals
    fn pressure(&self) -> f64 {
        self.read_channel(PRESSURE_FILE, 10.0, DEFAULT_PRESSURE)
    }
}
