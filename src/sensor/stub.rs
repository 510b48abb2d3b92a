use crate::sensor::{DEFAULT_HUMIDITY, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE, Sensor};

/// Stands in for a BME280 on machines without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSensor;

impl Sensor for StubSensor {
    fn model(&self) -> &str {
        "bme280"
    }

    fn temperature(&self) -> f64 {
        DEFAULT_TEMPERATURE
    }

    fn humidity(&self) -> f64 {
        DEFAULT_HUMIDITY
    }

    fn pressure(&self) -> f64 {
        DEFAULT_PRESSURE
    }
}
