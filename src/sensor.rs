mod iio;
mod stub;

pub use iio::*;
pub use stub::*;

pub const DEFAULT_TEMPERATURE: f64 = 10.21;
pub const DEFAULT_HUMIDITY: f64 = 62.36;
pub const DEFAULT_PRESSURE: f64 = 983.72;

// The device carries no gas sensor; these are the values it has always reported.
pub const FIXED_CO2: i64 = 1337;
pub const FIXED_TVOC: i64 = 28425;

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReadings {
    pub sensor: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub co2: i64,
    pub tvoc: i64,
}

/// Environmental sensor. Implementations never fail: a reading that cannot
/// be taken is replaced by its documented default.
pub trait Sensor: Send + Sync {
    fn model(&self) -> &str;

    /// Degrees Celsius.
    fn temperature(&self) -> f64;

    /// Percent relative humidity.
    fn humidity(&self) -> f64;

    /// Hectopascals.
    fn pressure(&self) -> f64;

    fn read(&self) -> SensorReadings {
        SensorReadings {
            sensor: self.model().to_string(),
            temperature: self.temperature(),
            humidity: self.humidity(),
            pressure: self.pressure(),
            co2: FIXED_CO2,
            tvoc: FIXED_TVOC,
        }
    }
}
