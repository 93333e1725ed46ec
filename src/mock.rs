//! Mock platform services for testing
//!
//! Records every subscription call for verification and lets tests play the
//! role of the platform delivery thread.
//!
//! Available during test builds and with the `mock` feature.

#![cfg(any(test, feature = "mock"))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{HardwareError, HwResult};
use crate::platform::{
    ListenerTable, LocationListener, LocationRequest, LocationService, SensorListener,
    SensorService,
};
use crate::sample::{LocationSample, SamplingRate, SensorAccuracy, SensorKind, SensorSample};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Sensor service call, for test verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCall {
    Register { kind: SensorKind, rate: SamplingRate },
    Unregister { kind: SensorKind },
}

/// Mock `SensorManager`
#[derive(Default)]
pub struct MockSensorService {
    present: Mutex<HashSet<SensorKind>>,
    listeners: ListenerTable,
    calls: Mutex<Vec<SensorCall>>,
    fail_register: AtomicBool,
}

impl MockSensorService {
    /// Device with the given sensors fitted
    pub fn new(present: &[SensorKind]) -> Self {
        Self {
            present: Mutex::new(present.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn with_all_sensors() -> Self {
        Self::new(&SensorKind::ALL)
    }

    /// Get call log
    pub fn calls(&self) -> Vec<SensorCall> {
        lock(&self.calls).clone()
    }

    pub fn is_registered(&self, kind: SensorKind) -> bool {
        self.listeners.has_sensor(kind)
    }

    /// Make subsequent registrations fail
    pub fn set_fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    /// Deliver a reading as the platform would; false if unregistered
    pub fn emit(&self, kind: SensorKind, timestamp: i64, values: [f64; 3]) -> bool {
        let sample = SensorSample::new(
            kind,
            timestamp,
            values[0],
            values[1],
            values[2],
            SensorAccuracy::High,
        );
        self.listeners.dispatch_sensor(sample)
    }

    pub fn emit_accuracy(&self, kind: SensorKind, accuracy: SensorAccuracy) -> bool {
        self.listeners.dispatch_accuracy(kind, accuracy)
    }
}

impl SensorService for MockSensorService {
    fn has_default_sensor(&self, kind: SensorKind) -> HwResult<bool> {
        Ok(lock(&self.present).contains(&kind))
    }

    fn register_listener(
        &self,
        kind: SensorKind,
        listener: Arc<dyn SensorListener>,
        rate: SamplingRate,
    ) -> HwResult<()> {
        lock(&self.calls).push(SensorCall::Register { kind, rate });
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(HardwareError::Platform(format!(
                "registerListener rejected {}",
                kind
            )));
        }
        self.listeners.set_sensor(kind, listener);
        Ok(())
    }

    fn unregister_listener(&self, kind: SensorKind) -> HwResult<()> {
        lock(&self.calls).push(SensorCall::Unregister { kind });
        self.listeners.clear_sensor(kind);
        Ok(())
    }
}

/// Location service call, for test verification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationCall {
    Request(LocationRequest),
    Remove,
}

/// Mock `LocationManager`
#[derive(Default)]
pub struct MockLocationService {
    providers: Mutex<Vec<String>>,
    listeners: ListenerTable,
    calls: Mutex<Vec<LocationCall>>,
    fail_request: AtomicBool,
}

impl MockLocationService {
    pub fn new(providers: &[&str]) -> Self {
        let service = Self::default();
        service.set_providers(providers);
        service
    }

    /// Change which providers the device reports
    pub fn set_providers(&self, providers: &[&str]) {
        *lock(&self.providers) = providers.iter().map(|p| p.to_string()).collect();
    }

    pub fn calls(&self) -> Vec<LocationCall> {
        lock(&self.calls).clone()
    }

    /// Requests made so far, in order
    pub fn requests(&self) -> Vec<LocationRequest> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                LocationCall::Request(request) => Some(*request),
                LocationCall::Remove => None,
            })
            .collect()
    }

    pub fn is_subscribed(&self) -> bool {
        self.listeners.has_location()
    }

    /// Make subsequent location requests fail
    pub fn set_fail_request(&self, fail: bool) {
        self.fail_request.store(fail, Ordering::SeqCst);
    }

    pub fn emit_location(&self, sample: LocationSample) -> bool {
        self.listeners.dispatch_location(sample)
    }

    pub fn emit_status(&self, status: &str) -> bool {
        self.listeners.dispatch_status(status)
    }
}

impl LocationService for MockLocationService {
    fn all_providers(&self) -> HwResult<Vec<String>> {
        Ok(lock(&self.providers).clone())
    }

    fn request_location_updates(
        &self,
        request: &LocationRequest,
        listener: Arc<dyn LocationListener>,
    ) -> HwResult<()> {
        lock(&self.calls).push(LocationCall::Request(*request));
        if self.fail_request.load(Ordering::SeqCst) {
            return Err(HardwareError::Platform(format!(
                "requestLocationUpdates rejected {}",
                request.provider
            )));
        }
        self.listeners.set_location(listener);
        Ok(())
    }

    fn remove_updates(&self) -> HwResult<()> {
        lock(&self.calls).push(LocationCall::Remove);
        self.listeners.clear_location();
        Ok(())
    }
}
