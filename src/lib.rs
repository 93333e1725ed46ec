// RSS Hardware JNI Library
// Exposes Android motion sensors and location providers to the host app via JNI

pub mod android_jni;
pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod java_platform;
pub mod location;
pub mod logging;
pub mod motion;
pub mod platform;
pub mod registry;
pub mod sample;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use buffer::EventBuffer;
pub use config::{HardwareConfig, LocationConfig};
pub use error::{HardwareError, HwResult};
pub use export::{LocationBatch, SampleCounts, SensorBatch};
pub use location::{select_provider, LocationBridge, ProviderState};
pub use motion::MotionSensorBridge;
pub use platform::{
    AccuracySink, LocationListener, LocationRequest, LocationService, SampleSink, SensorListener,
    SensorService, StatusSink,
};
pub use registry::HardwareRegistry;
pub use sample::{
    LocationProvider, LocationSample, SamplingRate, SensorAccuracy, SensorKind, SensorSample,
};

#[cfg(test)]
mod tests {
    use std::sync::Once;

    static LOGGER: Once = Once::new();

    /// Route test logging through env_logger; `RUST_LOG=debug` to see it
    pub(crate) fn init_test_logging() {
        LOGGER.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });
    }

    #[test]
    fn test_logging_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        crate::logging::init_logging("RssHardwareTest");
        crate::logging::init_logging("RssHardwareTest");
        log::debug!("logging initialized");
    }
}
