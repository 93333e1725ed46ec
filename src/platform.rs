//! Seam between the bridges and the Android services they subscribe to.
//!
//! Each platform callback kind is a single-method sink trait. A bridge's
//! listener implements the sinks for its callback surface and is handed to
//! the service as an `Arc`, so the service may invoke it from any thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::HwResult;
use crate::sample::{LocationProvider, LocationSample, SamplingRate, SensorAccuracy, SensorKind, SensorSample};

pub trait SampleSink<T>: Send + Sync {
    fn on_sample(&self, sample: T);
}

pub trait AccuracySink: Send + Sync {
    fn on_accuracy_changed(&self, accuracy: SensorAccuracy);
}

pub trait StatusSink: Send + Sync {
    fn on_status_changed(&self, status: &str);
}

/// Callback surface of an Android `SensorEventListener`
pub trait SensorListener: SampleSink<SensorSample> + AccuracySink {}

impl<L: SampleSink<SensorSample> + AccuracySink> SensorListener for L {}

/// Callback surface of an Android `LocationListener`
pub trait LocationListener: SampleSink<LocationSample> + StatusSink {}

impl<L: SampleSink<LocationSample> + StatusSink> LocationListener for L {}

/// Android `SensorManager` operations used by the motion bridges
pub trait SensorService: Send + Sync {
    /// Whether the device has a default sensor of this kind
    fn has_default_sensor(&self, kind: SensorKind) -> HwResult<bool>;

    fn register_listener(
        &self,
        kind: SensorKind,
        listener: Arc<dyn SensorListener>,
        rate: SamplingRate,
    ) -> HwResult<()>;

    fn unregister_listener(&self, kind: SensorKind) -> HwResult<()>;
}

/// Parameters of a `requestLocationUpdates` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub provider: LocationProvider,
    pub min_time_ms: u64,
    pub min_distance_m: f32,
}

/// Android `LocationManager` operations used by the location bridge
pub trait LocationService: Send + Sync {
    /// Names of every provider the device knows about
    fn all_providers(&self) -> HwResult<Vec<String>>;

    fn request_location_updates(
        &self,
        request: &LocationRequest,
        listener: Arc<dyn LocationListener>,
    ) -> HwResult<()>;

    fn remove_updates(&self) -> HwResult<()>;
}

/// Registered listeners, keyed the way the platform delivers callbacks.
///
/// Platform implementations route incoming events through this table, so an
/// event for a kind with no registered listener is dropped.
#[derive(Default)]
pub struct ListenerTable {
    sensors: Mutex<HashMap<SensorKind, Arc<dyn SensorListener>>>,
    location: Mutex<Option<Arc<dyn LocationListener>>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    // Listener bookkeeping stays valid across a panicking callback.
    fn sensors(&self) -> MutexGuard<'_, HashMap<SensorKind, Arc<dyn SensorListener>>> {
        self.sensors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn location(&self) -> MutexGuard<'_, Option<Arc<dyn LocationListener>>> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_sensor(&self, kind: SensorKind, listener: Arc<dyn SensorListener>) {
        self.sensors().insert(kind, listener);
    }

    pub fn clear_sensor(&self, kind: SensorKind) -> bool {
        self.sensors().remove(&kind).is_some()
    }

    pub fn has_sensor(&self, kind: SensorKind) -> bool {
        self.sensors().contains_key(&kind)
    }

    pub fn set_location(&self, listener: Arc<dyn LocationListener>) {
        *self.location() = Some(listener);
    }

    pub fn clear_location(&self) -> bool {
        self.location().take().is_some()
    }

    pub fn has_location(&self) -> bool {
        self.location().is_some()
    }

    /// Deliver a sensor event; returns false when nobody is listening
    pub fn dispatch_sensor(&self, sample: SensorSample) -> bool {
        // Clone out so the callback runs without the table locked
        let listener = self.sensors().get(&sample.kind).cloned();
        match listener {
            Some(listener) => {
                listener.on_sample(sample);
                true
            }
            None => false,
        }
    }

    pub fn dispatch_accuracy(&self, kind: SensorKind, accuracy: SensorAccuracy) -> bool {
        let listener = self.sensors().get(&kind).cloned();
        match listener {
            Some(listener) => {
                listener.on_accuracy_changed(accuracy);
                true
            }
            None => false,
        }
    }

    pub fn dispatch_location(&self, sample: LocationSample) -> bool {
        let listener = self.location().clone();
        match listener {
            Some(listener) => {
                listener.on_sample(sample);
                true
            }
            None => false,
        }
    }

    pub fn dispatch_status(&self, status: &str) -> bool {
        let listener = self.location().clone();
        match listener {
            Some(listener) => {
                listener.on_status_changed(status);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        samples: AtomicUsize,
        accuracy: AtomicUsize,
    }

    impl SampleSink<SensorSample> for Counter {
        fn on_sample(&self, _sample: SensorSample) {
            self.samples.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AccuracySink for Counter {
        fn on_accuracy_changed(&self, _accuracy: SensorAccuracy) {
            self.accuracy.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let table = ListenerTable::new();
        let counter = Arc::new(Counter::default());
        table.set_sensor(SensorKind::Gyroscope, counter.clone());

        let gyro = SensorSample::new(SensorKind::Gyroscope, 1, 0.0, 0.0, 0.0, SensorAccuracy::High);
        let accel = SensorSample::new(SensorKind::Accelerometer, 1, 0.0, 0.0, 0.0, SensorAccuracy::High);

        assert!(table.dispatch_sensor(gyro));
        assert!(!table.dispatch_sensor(accel));
        assert!(table.dispatch_accuracy(SensorKind::Gyroscope, SensorAccuracy::Low));
        assert_eq!(counter.samples.load(Ordering::SeqCst), 1);
        assert_eq!(counter.accuracy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cleared_listener_receives_nothing() {
        let table = ListenerTable::new();
        let counter = Arc::new(Counter::default());
        table.set_sensor(SensorKind::Accelerometer, counter.clone());

        assert!(table.clear_sensor(SensorKind::Accelerometer));
        assert!(!table.clear_sensor(SensorKind::Accelerometer));

        let sample = SensorSample::new(SensorKind::Accelerometer, 1, 1.0, 1.0, 1.0, SensorAccuracy::High);
        assert!(!table.dispatch_sensor(sample));
        assert_eq!(counter.samples.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_location_dispatch_without_listener() {
        let table = ListenerTable::new();
        assert!(!table.dispatch_status("OUT_OF_SERVICE"));
        assert!(!table.has_location());
    }
}
