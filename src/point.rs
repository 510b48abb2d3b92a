use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::config::DeviceConfig;
use crate::geo::GeoLocation;
use crate::sensor::SensorReadings;

pub const MEASUREMENT: &str = "environment";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Integer(v) => write!(f, "{v}i"),
        }
    }
}

/// One timestamped measurement record.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub measurement: String,
    pub tags: IndexMap<String, String>,
    pub fields: IndexMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    pub fn new(measurement: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags: IndexMap::new(),
            fields: IndexMap::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn field(mut self, key: &str, value: FieldValue) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Renders the point in InfluxDB line protocol with nanosecond precision.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            let _ = write!(
                line,
                ",{}={}",
                escape(key, &[',', '=', ' ']),
                escape(value, &[',', '=', ' '])
            );
        }

        let fields = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={value}", escape(key, &[',', '=', ' '])))
            .collect::<Vec<_>>()
            .join(",");
        line.push(' ');
        line.push_str(&fields);

        // Out-of-range instants are left for the server to stamp.
        if let Some(nanos) = self.timestamp.timestamp_nanos_opt() {
            let _ = write!(line, " {nanos}");
        }

        line
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Assembles `environment` points. Pure; every input has already applied
/// its own fallbacks.
#[derive(Debug, Clone)]
pub struct PointBuilder {
    device: String,
}

impl PointBuilder {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
        }
    }

    pub fn build(
        &self,
        config: &DeviceConfig,
        readings: &SensorReadings,
        geo: &GeoLocation,
        now: DateTime<Utc>,
    ) -> MetricPoint {
        MetricPoint::new(MEASUREMENT, now)
            .tag("clientId", &config.id)
            .tag("device", &self.device)
            .tag("sensor", &readings.sensor)
            .field("Temperature", FieldValue::Float(readings.temperature))
            .field("Humidity", FieldValue::Float(readings.humidity))
            .field("Pressure", FieldValue::Float(readings.pressure))
            .field("CO2", FieldValue::Integer(readings.co2))
            .field("TVOC", FieldValue::Integer(readings.tvoc))
            .field("Lat", FieldValue::Float(geo.latitude))
            .field("Lon", FieldValue::Float(geo.longitude))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;

    fn config() -> DeviceConfig {
        DeviceConfig {
            id: "dev-1".to_string(),
            influx_url: "http://db".to_string(),
            influx_org: "o".to_string(),
            influx_token: "t".to_string(),
            influx_bucket: "b".to_string(),
            configuration_refresh: Duration::from_secs(300),
            measurement_interval: Duration::from_secs(10),
            default_lat: 50.0,
            default_lon: 14.0,
        }
    }

    fn readings() -> SensorReadings {
        SensorReadings {
            sensor: "bme280".to_string(),
            temperature: 10.21,
            humidity: 62.36,
            pressure: 983.72,
            co2: 1337,
            tvoc: 28425,
        }
    }

    #[test]
    fn test_build_populates_every_tag_and_field() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let geo = GeoLocation {
            latitude: 50.126144,
            longitude: 14.50462,
        };

        let point = PointBuilder::new("raspberrypi").build(&config(), &readings(), &geo, now);

        assert_eq!(point.measurement, "environment");
        assert_eq!(point.timestamp, now);
        assert_eq!(
            point.tags.keys().collect::<Vec<_>>(),
            vec!["clientId", "device", "sensor"]
        );
        assert_eq!(point.tags["clientId"], "dev-1");
        assert_eq!(point.tags["device"], "raspberrypi");
        assert_eq!(point.tags["sensor"], "bme280");
        assert_eq!(
            point.fields.keys().collect::<Vec<_>>(),
            vec!["Temperature", "Humidity", "Pressure", "CO2", "TVOC", "Lat", "Lon"]
        );
        assert_eq!(point.fields["Temperature"], FieldValue::Float(10.21));
        assert_eq!(point.fields["CO2"], FieldValue::Integer(1337));
        assert_eq!(point.fields["Lat"], FieldValue::Float(50.126144));
    }

    #[test]
    fn test_line_protocol() {
        let now = Utc.timestamp_opt(1_714_564_800, 0).unwrap();
        let geo = GeoLocation {
            latitude: 50.0,
            longitude: 14.5,
        };

        let point = PointBuilder::new("raspberrypi").build(&config(), &readings(), &geo, now);

        assert_eq!(
            point.to_line_protocol(),
            "environment,clientId=dev-1,device=raspberrypi,sensor=bme280 \
             Temperature=10.21,Humidity=62.36,Pressure=983.72,CO2=1337i,TVOC=28425i,Lat=50,Lon=14.5 \
             1714564800000000000"
        );
    }

    #[test]
    fn test_line_protocol_escaping() {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let point = MetricPoint::new("my measurement", now)
            .tag("client id", "a,b=c")
            .field("x y", FieldValue::Float(1.5));

        assert_eq!(
            point.to_line_protocol(),
            "my\\ measurement,client\\ id=a\\,b\\=c x\\ y=1.5 0"
        );
    }
}
