use serde::{Deserialize, Serialize};

use crate::location::LocationBridge;
use crate::motion::MotionSensorBridge;
use crate::sample::{LocationSample, SensorAccuracy, SensorKind, SensorSample};

/// Motion samples drained in one host read (JSON-serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorBatch {
    pub kind: SensorKind,
    pub enabled: bool,
    pub accuracy: SensorAccuracy,
    pub samples: Vec<SensorSample>,
}

impl SensorBatch {
    /// Flush `bridge` and package what it held
    pub fn drain(bridge: &MotionSensorBridge) -> Self {
        Self {
            kind: bridge.kind(),
            enabled: bridge.is_enabled(),
            accuracy: bridge.accuracy(),
            samples: bridge.flush(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Location fixes drained in one host read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBatch {
    pub provider: Option<String>,
    pub status: String,
    /// RFC 3339 time of the newest fix in `samples`
    pub latest_fix_time: Option<String>,
    pub samples: Vec<LocationSample>,
}

impl LocationBatch {
    pub fn drain(bridge: &LocationBridge) -> Self {
        let samples = bridge.flush();
        let latest_fix_time = samples
            .iter()
            .filter_map(LocationSample::fix_time)
            .max()
            .map(|time| time.to_rfc3339());

        Self {
            provider: bridge.provider().map(|p| p.as_str().to_string()),
            status: bridge.status(),
            latest_fix_time,
            samples,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Pending buffer sizes, for host-side status displays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub accelerometer: usize,
    pub linear_acceleration: usize,
    pub gyroscope: usize,
    pub location: usize,
}

impl SampleCounts {
    pub fn as_array(&self) -> [i32; 4] {
        [
            self.accelerometer,
            self.linear_acceleration,
            self.gyroscope,
            self.location,
        ]
        .map(|count| i32::try_from(count).unwrap_or(i32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use crate::mock::{MockLocationService, MockSensorService};
    use crate::sample::SamplingRate;
    use std::sync::Arc;

    #[test]
    fn test_sensor_batch_drains_bridge() {
        let service = Arc::new(MockSensorService::with_all_sensors());
        let accel = MotionSensorBridge::new(SensorKind::Accelerometer, service.clone(), SamplingRate::Fastest, 4);
        accel.enable(true).unwrap();
        service.emit(SensorKind::Accelerometer, 42, [0.0, 0.0, 9.81]);

        let batch = SensorBatch::drain(&accel);
        assert!(batch.enabled);
        assert_eq!(batch.samples.len(), 1);
        assert!(accel.is_empty());

        let json = batch.to_json().unwrap();
        assert!(json.contains("\"Accelerometer\""));
        assert!(json.contains("9.81"));
    }

    #[test]
    fn test_location_batch_json() {
        let service = Arc::new(MockLocationService::new(&["gps"]));
        let gps = LocationBridge::new(service.clone(), LocationConfig::default(), 4);
        gps.refresh_or_start().unwrap();
        service.emit_location(LocationSample::new("gps", 1, 40.0, -120.0, 100.0, 5.0, 15.0, 90.0));

        let batch = LocationBatch::drain(&gps);
        assert_eq!(batch.provider.as_deref(), Some("gps"));
        assert_eq!(batch.latest_fix_time.as_deref(), Some("1970-01-01T00:00:00.001+00:00"));

        let json = batch.to_json().unwrap();
        assert!(json.contains("-120"));
        assert!(gps.is_empty());
    }

    #[test]
    fn test_latest_fix_time_picks_newest() {
        let service = Arc::new(MockLocationService::new(&["network"]));
        let gps = LocationBridge::new(service.clone(), LocationConfig::default(), 4);
        gps.refresh_or_start().unwrap();
        service.emit_location(LocationSample::new("network", 1_700_000_005_000, 1.0, 2.0, 3.0, 30.0, 0.0, 0.0));
        service.emit_location(LocationSample::new("network", 1_700_000_000_000, 1.0, 2.0, 3.0, 30.0, 0.0, 0.0));

        let batch = LocationBatch::drain(&gps);
        assert_eq!(batch.latest_fix_time.as_deref(), Some("2023-11-14T22:13:25+00:00"));

        let empty = LocationBatch::drain(&gps);
        assert!(empty.latest_fix_time.is_none());
    }

    #[test]
    fn test_counts_array_order() {
        let counts = SampleCounts {
            accelerometer: 1,
            linear_acceleration: 2,
            gyroscope: 3,
            location: 4,
        };
        assert_eq!(counts.as_array(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_counts_saturate_at_java_int() {
        let counts = SampleCounts {
            accelerometer: usize::MAX,
            linear_acceleration: i32::MAX as usize + 1,
            gyroscope: 0,
            location: 5,
        };
        assert_eq!(counts.as_array(), [i32::MAX, i32::MAX, 0, 5]);
    }
}
