//! GPS / network location bridge.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::buffer::EventBuffer;
use crate::config::LocationConfig;
use crate::error::{HardwareError, HwResult};
use crate::platform::{LocationRequest, LocationService, SampleSink, StatusSink};
use crate::sample::{LocationProvider, LocationSample};

/// First provider in `priority` that the device offers
pub fn select_provider<S: AsRef<str>>(
    priority: &[LocationProvider],
    available: &[S],
) -> Option<LocationProvider> {
    priority
        .iter()
        .copied()
        .find(|p| available.iter().any(|a| a.as_ref() == p.as_str()))
}

struct FixListener {
    buffer: EventBuffer<LocationSample>,
    status: Mutex<String>,
}

impl FixListener {
    fn status(&self) -> MutexGuard<'_, String> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SampleSink<LocationSample> for FixListener {
    fn on_sample(&self, sample: LocationSample) {
        self.buffer.push(sample);
    }
}

impl StatusSink for FixListener {
    fn on_status_changed(&self, status: &str) {
        let mut current = self.status();
        current.clear();
        current.push_str(status);
    }
}

/// Provider selection, mutated only by `refresh_or_start` and `stop`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    pub provider: Option<LocationProvider>,
    pub available: Vec<String>,
    pub subscribed: bool,
}

/// Buffers location fixes from the best available provider
pub struct LocationBridge {
    service: Arc<dyn LocationService>,
    config: LocationConfig,
    listener: Arc<FixListener>,
    state: Mutex<ProviderState>,
}

impl LocationBridge {
    pub fn new(service: Arc<dyn LocationService>, config: LocationConfig, buffer_capacity: usize) -> Self {
        Self {
            service,
            config,
            listener: Arc::new(FixListener {
                buffer: EventBuffer::with_capacity(buffer_capacity),
                status: Mutex::new(String::new()),
            }),
            state: Mutex::new(ProviderState::default()),
        }
    }

    fn state(&self) -> HwResult<MutexGuard<'_, ProviderState>> {
        self.state.lock().map_err(|_| {
            HardwareError::Internal("Failed to acquire location provider lock".to_string())
        })
    }

    /// Re-enumerate providers and subscribe to the best one.
    ///
    /// Keeps the current subscription when the best provider is unchanged or
    /// when no ranked provider is available at all.
    pub fn refresh_or_start(&self) -> HwResult<()> {
        let available = self.service.all_providers()?;
        let selected = select_provider(&self.config.provider_priority, &available);

        let mut state = self.state()?;
        debug!("Location providers available: {:?}", available);
        state.available = available;

        let Some(selected) = selected else {
            debug!("No usable location provider, keeping {:?}", state.provider);
            return Ok(());
        };

        if state.provider == Some(selected) {
            return Ok(());
        }

        if state.subscribed {
            self.service.remove_updates()?;
            state.subscribed = false;
            state.provider = None;
        }

        let request = LocationRequest {
            provider: selected,
            min_time_ms: self.config.min_time_ms,
            min_distance_m: self.config.min_distance_m,
        };
        self.service
            .request_location_updates(&request, self.listener.clone())?;
        state.provider = Some(selected);
        state.subscribed = true;

        info!("Location updates started from '{}' provider", selected);
        Ok(())
    }

    /// Stop location updates; a later `refresh_or_start` subscribes afresh
    pub fn stop(&self) -> HwResult<()> {
        let mut state = self.state()?;
        if state.subscribed {
            self.service.remove_updates()?;
            info!("Location updates stopped");
        }
        state.subscribed = false;
        state.provider = None;
        Ok(())
    }

    pub fn flush(&self) -> Vec<LocationSample> {
        self.listener.buffer.flush()
    }

    pub fn snapshot(&self) -> Vec<LocationSample> {
        self.listener.buffer.snapshot()
    }

    pub fn len(&self) -> usize {
        self.listener.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listener.buffer.is_empty()
    }

    pub fn total_fixes(&self) -> u64 {
        self.listener.buffer.total_appended()
    }

    pub fn provider(&self) -> Option<LocationProvider> {
        self.state().ok().and_then(|s| s.provider)
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.state().map(|s| s.available.clone()).unwrap_or_default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.state().map(|s| s.subscribed).unwrap_or(false)
    }

    /// Last status string reported by the provider
    pub fn status(&self) -> String {
        self.listener.status().clone()
    }
}

impl SampleSink<LocationSample> for LocationBridge {
    fn on_sample(&self, sample: LocationSample) {
        self.listener.on_sample(sample);
    }
}

impl StatusSink for LocationBridge {
    fn on_status_changed(&self, status: &str) {
        self.listener.on_status_changed(status);
    }
}
