use std::sync::Arc;

use log::warn;

use crate::config::HardwareConfig;
use crate::error::HwResult;
use crate::export::SampleCounts;
use crate::location::LocationBridge;
use crate::motion::MotionSensorBridge;
use crate::platform::{LocationService, SensorService};
use crate::sample::SensorKind;

/// One bridge per hardware resource, alive for the host process lifetime
pub struct HardwareRegistry {
    accelerometer: MotionSensorBridge,
    linear_accelerometer: MotionSensorBridge,
    gyroscope: MotionSensorBridge,
    location: LocationBridge,
}

impl HardwareRegistry {
    pub fn new(
        sensors: Arc<dyn SensorService>,
        locations: Arc<dyn LocationService>,
        config: &HardwareConfig,
    ) -> Self {
        let motion = |kind| {
            MotionSensorBridge::new(
                kind,
                sensors.clone(),
                config.sampling_rate,
                config.sensor_buffer_capacity,
            )
        };

        Self {
            accelerometer: motion(SensorKind::Accelerometer),
            linear_accelerometer: motion(SensorKind::LinearAcceleration),
            gyroscope: motion(SensorKind::Gyroscope),
            location: LocationBridge::new(
                locations,
                config.location.clone(),
                config.location_buffer_capacity,
            ),
        }
    }

    pub fn motion(&self, kind: SensorKind) -> &MotionSensorBridge {
        match kind {
            SensorKind::Accelerometer => &self.accelerometer,
            SensorKind::LinearAcceleration => &self.linear_accelerometer,
            SensorKind::Gyroscope => &self.gyroscope,
        }
    }

    pub fn location(&self) -> &LocationBridge {
        &self.location
    }

    /// Unsubscribe everything, e.g. when the host app pauses.
    /// Every bridge is attempted; the first failure is returned.
    pub fn stop_all(&self) -> HwResult<()> {
        let mut first_error = None;

        for kind in SensorKind::ALL {
            if let Err(e) = self.motion(kind).enable(false) {
                warn!("Failed to disable {}: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }
        if let Err(e) = self.location.stop() {
            warn!("Failed to stop location updates: {}", e);
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn sample_counts(&self) -> SampleCounts {
        SampleCounts {
            accelerometer: self.accelerometer.len(),
            linear_acceleration: self.linear_accelerometer.len(),
            gyroscope: self.gyroscope.len(),
            location: self.location.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLocationService, MockSensorService};
    use crate::sample::LocationSample;

    fn registry() -> (Arc<MockSensorService>, Arc<MockLocationService>, HardwareRegistry) {
        let sensors = Arc::new(MockSensorService::with_all_sensors());
        let locations = Arc::new(MockLocationService::new(&["gps", "network"]));
        let registry = HardwareRegistry::new(sensors.clone(), locations.clone(), &HardwareConfig::default());
        (sensors, locations, registry)
    }

    #[test]
    fn test_bridges_are_independent() {
        let (sensors, _, registry) = registry();
        registry.motion(SensorKind::Accelerometer).enable(true).unwrap();
        registry.motion(SensorKind::Gyroscope).enable(true).unwrap();

        sensors.emit(SensorKind::Gyroscope, 1, [0.1, 0.2, 0.3]);
        sensors.emit(SensorKind::Gyroscope, 2, [0.1, 0.2, 0.3]);
        sensors.emit(SensorKind::Accelerometer, 1, [0.0, 0.0, 9.8]);

        let counts = registry.sample_counts();
        assert_eq!(counts.gyroscope, 2);
        assert_eq!(counts.accelerometer, 1);
        assert_eq!(counts.linear_acceleration, 0);

        registry.motion(SensorKind::Gyroscope).flush();
        assert_eq!(registry.sample_counts().accelerometer, 1);
    }

    #[test]
    fn test_stop_all_unsubscribes_everything() {
        let (sensors, locations, registry) = registry();
        for kind in SensorKind::ALL {
            registry.motion(kind).enable(true).unwrap();
        }
        registry.location().refresh_or_start().unwrap();
        locations.emit_location(LocationSample::new("gps", 1, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0));

        registry.stop_all().unwrap();

        for kind in SensorKind::ALL {
            assert!(!sensors.is_registered(kind));
            assert!(!registry.motion(kind).is_enabled());
        }
        assert!(!locations.is_subscribed());
        // Buffered data survives until the host flushes it
        assert_eq!(registry.sample_counts().location, 1);
    }
}
