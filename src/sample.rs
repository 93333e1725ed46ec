use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HardwareError;

/// Motion sensor kinds, carrying the Android `Sensor.TYPE_*` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    LinearAcceleration,
    Gyroscope,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Accelerometer,
        SensorKind::LinearAcceleration,
        SensorKind::Gyroscope,
    ];

    /// Android `Sensor.TYPE_*` constant
    pub fn type_code(self) -> i32 {
        match self {
            SensorKind::Accelerometer => 1,
            SensorKind::Gyroscope => 4,
            SensorKind::LinearAcceleration => 10,
        }
    }

    pub fn from_type_code(code: i32) -> Result<Self, HardwareError> {
        match code {
            1 => Ok(SensorKind::Accelerometer),
            4 => Ok(SensorKind::Gyroscope),
            10 => Ok(SensorKind::LinearAcceleration),
            other => Err(HardwareError::UnknownSensor(other)),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::LinearAcceleration => "linear_acceleration",
            SensorKind::Gyroscope => "gyroscope",
        };
        f.write_str(name)
    }
}

/// Reported sensor accuracy (`SensorManager.SENSOR_STATUS_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorAccuracy {
    NoContact,
    #[default]
    Unreliable,
    Low,
    Medium,
    High,
}

impl SensorAccuracy {
    /// Unknown codes are treated as unreliable
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => SensorAccuracy::NoContact,
            1 => SensorAccuracy::Low,
            2 => SensorAccuracy::Medium,
            3 => SensorAccuracy::High,
            _ => SensorAccuracy::Unreliable,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            SensorAccuracy::NoContact => -1,
            SensorAccuracy::Unreliable => 0,
            SensorAccuracy::Low => 1,
            SensorAccuracy::Medium => 2,
            SensorAccuracy::High => 3,
        }
    }
}

/// Requested delivery rate (`SensorManager.SENSOR_DELAY_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingRate {
    #[default]
    Fastest,
    Game,
    Ui,
    Normal,
}

impl SamplingRate {
    pub fn delay_code(self) -> i32 {
        match self {
            SamplingRate::Fastest => 0,
            SamplingRate::Game => 1,
            SamplingRate::Ui => 2,
            SamplingRate::Normal => 3,
        }
    }
}

/// One motion sensor reading from an Android `SensorEvent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Event time in nanoseconds, as stamped by the platform
    pub timestamp: i64,
    pub kind: SensorKind,
    pub values: Vector3<f64>,
    pub accuracy: SensorAccuracy,
}

impl SensorSample {
    pub fn new(
        kind: SensorKind,
        timestamp: i64,
        x: f64,
        y: f64,
        z: f64,
        accuracy: SensorAccuracy,
    ) -> Self {
        Self {
            timestamp,
            kind,
            values: Vector3::new(x, y, z),
            accuracy,
        }
    }
}

/// Location providers the bridge knows how to rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    Fused,
    Gps,
    Network,
}

impl LocationProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationProvider::Fused => "fused",
            LocationProvider::Gps => "gps",
            LocationProvider::Network => "network",
        }
    }
}

impl FromStr for LocationProvider {
    type Err = HardwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fused" => Ok(LocationProvider::Fused),
            "gps" => Ok(LocationProvider::Gps),
            "network" => Ok(LocationProvider::Network),
            other => Err(HardwareError::InvalidConfig(format!(
                "unsupported location provider '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for LocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location fix from Android LocationManager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Fix time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Horizontal accuracy radius in meters
    pub accuracy: f64,
    pub speed: f64,
    pub bearing: f64,
    pub provider: String,
}

impl LocationSample {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: impl Into<String>,
        timestamp: i64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        accuracy: f64,
        speed: f64,
        bearing: f64,
    ) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude,
            accuracy,
            speed,
            bearing,
            provider: provider.into(),
        }
    }

    pub fn fix_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sensor_axes() {
        let sample = SensorSample::new(SensorKind::Gyroscope, 7, 0.1, -0.2, 0.3, SensorAccuracy::Medium);
        assert_relative_eq!(sample.values.x, 0.1);
        assert_relative_eq!(sample.values.y, -0.2);
        assert_relative_eq!(sample.values.z, 0.3);
        assert_eq!(sample.kind, SensorKind::Gyroscope);
    }

    #[test]
    fn test_type_codes() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_type_code(kind.type_code()).unwrap(), kind);
        }
        assert!(SensorKind::from_type_code(2).is_err());
    }

    #[test]
    fn test_accuracy_codes() {
        assert_eq!(SensorAccuracy::from_raw(3), SensorAccuracy::High);
        assert_eq!(SensorAccuracy::from_raw(-1), SensorAccuracy::NoContact);
        assert_eq!(SensorAccuracy::from_raw(42), SensorAccuracy::Unreliable);
        assert_eq!(SensorAccuracy::Medium.as_raw(), 2);
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("gps".parse::<LocationProvider>().unwrap(), LocationProvider::Gps);
        assert!("passive".parse::<LocationProvider>().is_err());
    }

    #[test]
    fn test_fix_time() {
        let fix = LocationSample::new("gps", 1_700_000_000_000, 40.0, -120.0, 100.0, 5.0, 15.0, 90.0);
        let time = fix.fix_time().unwrap();
        assert_eq!(time.timestamp(), 1_700_000_000);
    }
}
