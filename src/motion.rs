//! Accelerometer, linear acceleration and gyroscope bridges.

use std::sync::{Arc, Mutex};

use crossbeam::atomic::AtomicCell;
use log::{debug, info};

use crate::buffer::EventBuffer;
use crate::error::{HardwareError, HwResult};
use crate::platform::{AccuracySink, SampleSink, SensorService};
use crate::sample::{SamplingRate, SensorAccuracy, SensorKind, SensorSample};

/// State shared with the platform delivery thread
struct MotionListener {
    buffer: EventBuffer<SensorSample>,
    accuracy: AtomicCell<SensorAccuracy>,
}

impl SampleSink<SensorSample> for MotionListener {
    fn on_sample(&self, sample: SensorSample) {
        self.buffer.push(sample);
    }
}

impl AccuracySink for MotionListener {
    fn on_accuracy_changed(&self, accuracy: SensorAccuracy) {
        self.accuracy.store(accuracy);
    }
}

/// Buffers events from one motion sensor until the host drains them
pub struct MotionSensorBridge {
    kind: SensorKind,
    rate: SamplingRate,
    service: Arc<dyn SensorService>,
    listener: Arc<MotionListener>,
    registered: Mutex<bool>,
}

impl MotionSensorBridge {
    pub fn new(
        kind: SensorKind,
        service: Arc<dyn SensorService>,
        rate: SamplingRate,
        buffer_capacity: usize,
    ) -> Self {
        Self {
            kind,
            rate,
            service,
            listener: Arc::new(MotionListener {
                buffer: EventBuffer::with_capacity(buffer_capacity),
                accuracy: AtomicCell::new(SensorAccuracy::default()),
            }),
            registered: Mutex::new(false),
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Subscribe to or unsubscribe from the platform sensor.
    ///
    /// A device without this sensor makes `enable(true)` a no-op. Repeated
    /// calls with the same value make no further platform calls.
    pub fn enable(&self, on: bool) -> HwResult<()> {
        let mut registered = self.registered.lock().map_err(|_| {
            HardwareError::Internal(format!("Failed to acquire {} registration lock", self.kind))
        })?;

        if on {
            if *registered {
                debug!("{} already enabled", self.kind);
                return Ok(());
            }
            if !self.service.has_default_sensor(self.kind)? {
                debug!("No {} on this device, enable ignored", self.kind);
                return Ok(());
            }
            self.service
                .register_listener(self.kind, self.listener.clone(), self.rate)?;
            *registered = true;
            info!("{} enabled at {:?} rate", self.kind, self.rate);
        } else if *registered {
            self.service.unregister_listener(self.kind)?;
            *registered = false;
            info!("{} disabled", self.kind);
        }

        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.registered.lock().map(|r| *r).unwrap_or(false)
    }

    /// Discard buffered samples, handing them back to the caller
    pub fn flush(&self) -> Vec<SensorSample> {
        self.listener.buffer.flush()
    }

    pub fn snapshot(&self) -> Vec<SensorSample> {
        self.listener.buffer.snapshot()
    }

    pub fn len(&self) -> usize {
        self.listener.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listener.buffer.is_empty()
    }

    /// Samples received since construction, including flushed ones
    pub fn total_samples(&self) -> u64 {
        self.listener.buffer.total_appended()
    }

    /// Last accuracy reported by the platform
    pub fn accuracy(&self) -> SensorAccuracy {
        self.listener.accuracy.load()
    }
}

impl SampleSink<SensorSample> for MotionSensorBridge {
    fn on_sample(&self, sample: SensorSample) {
        self.listener.on_sample(sample);
    }
}

impl AccuracySink for MotionSensorBridge {
    fn on_accuracy_changed(&self, accuracy: SensorAccuracy) {
        self.listener.on_accuracy_changed(accuracy);
    }
}
