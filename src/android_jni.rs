//! JNI exports for the `org.rss.Hardware` Java shim.
//!
//! Host-facing calls return `0`/`-1` or a value, throwing a Java exception on
//! error. `nativeOn*` callbacks come from the Android listener threads and
//! never throw: events for unknown or unsubscribed sensors are dropped.

use crate::config::HardwareConfig;
use crate::error::{throw_java_exception, HardwareError, HwResult};
use crate::export::{LocationBatch, SensorBatch};
use crate::java_platform::JavaPlatform;
use crate::logging::init_logging;
use crate::registry::HardwareRegistry;
use crate::sample::{LocationSample, SensorAccuracy, SensorKind, SensorSample};
use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jdouble, jfloat, jint, jintArray, jlong, jstring, JNI_FALSE};
use jni::JNIEnv;
use log::{info, warn};
use std::sync::{Arc, Mutex};

struct Hardware {
    platform: Arc<JavaPlatform>,
    registry: HardwareRegistry,
}

// Global bridge state - stored as static to persist across JNI calls
lazy_static::lazy_static! {
    static ref GLOBAL_HARDWARE: Arc<Mutex<Option<Arc<Hardware>>>> = Arc::new(Mutex::new(None));
}

fn get_hardware() -> HwResult<Arc<Hardware>> {
    let guard = GLOBAL_HARDWARE.lock().map_err(|_| {
        HardwareError::Internal("Failed to acquire global hardware lock".to_string())
    })?;
    guard.as_ref().cloned().ok_or(HardwareError::NotInitialized)
}

fn status_result(env: &mut JNIEnv, result: HwResult<()>) -> jint {
    match result {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(env, &e);
            -1
        }
    }
}

fn string_result(env: &mut JNIEnv, result: HwResult<String>) -> jstring {
    let created = result.and_then(|s| env.new_string(s).map_err(HardwareError::from));
    match created {
        Ok(jstr) => jstr.into_raw(),
        Err(e) => {
            let _ = throw_java_exception(env, &e);
            std::ptr::null_mut()
        }
    }
}

fn read_java_string(env: &mut JNIEnv, value: &JString) -> HwResult<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    Ok(env.get_string(value)?.into())
}

/// JNI: Build the bridges. Parameters: config JSON (may be null or empty)
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_nativeInit(
    mut env: JNIEnv,
    class: JClass,
    config_json: JString,
) -> jint {
    let result = init_impl(&mut env, &class, &config_json);
    status_result(&mut env, result)
}

fn init_impl(env: &mut JNIEnv, class: &JClass, config_json: &JString) -> HwResult<()> {
    let json = read_java_string(env, config_json)?;
    let config = HardwareConfig::from_json(&json)?;
    init_logging(&config.log_tag);

    let mut guard = GLOBAL_HARDWARE.lock().map_err(|_| {
        HardwareError::Internal("Failed to acquire global hardware lock".to_string())
    })?;

    // The registry lives for the process; a second init keeps it
    if guard.is_some() {
        info!("Hardware bridges already initialized");
        return Ok(());
    }

    let platform = Arc::new(JavaPlatform::new(env, class)?);
    let registry = HardwareRegistry::new(platform.clone(), platform.clone(), &config);
    *guard = Some(Arc::new(Hardware { platform, registry }));

    info!("Hardware bridges initialized ({:?} sampling)", config.sampling_rate);
    Ok(())
}

fn sensor_enable_impl(kind: SensorKind, enable: jboolean) -> HwResult<()> {
    let hardware = get_hardware()?;
    hardware.registry.motion(kind).enable(enable != JNI_FALSE)
}

/// JNI: Enable/disable the accelerometer
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_accelerometerEnable(
    mut env: JNIEnv,
    _class: JClass,
    enable: jboolean,
) -> jint {
    let result = sensor_enable_impl(SensorKind::Accelerometer, enable);
    status_result(&mut env, result)
}

/// JNI: Enable/disable the linear acceleration sensor (gravity removed)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_linearAccelerometerEnable(
    mut env: JNIEnv,
    _class: JClass,
    enable: jboolean,
) -> jint {
    let result = sensor_enable_impl(SensorKind::LinearAcceleration, enable);
    status_result(&mut env, result)
}

/// JNI: Enable/disable the gyroscope
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gyroscopeEnable(
    mut env: JNIEnv,
    _class: JClass,
    enable: jboolean,
) -> jint {
    let result = sensor_enable_impl(SensorKind::Gyroscope, enable);
    status_result(&mut env, result)
}

/// JNI: Select the best location provider and subscribe to it
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsRefreshOrStart(
    mut env: JNIEnv,
    _class: JClass,
) -> jint {
    let result = get_hardware().and_then(|hw| hw.registry.location().refresh_or_start());
    status_result(&mut env, result)
}

/// JNI: Stop location updates
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsStop(mut env: JNIEnv, _class: JClass) -> jint {
    let result = get_hardware().and_then(|hw| hw.registry.location().stop());
    status_result(&mut env, result)
}

/// JNI: Unsubscribe every sensor and location updates (host pause)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_stopAll(mut env: JNIEnv, _class: JClass) -> jint {
    let result = get_hardware().and_then(|hw| hw.registry.stop_all());
    status_result(&mut env, result)
}

/// JNI: Discard buffered motion samples. Parameters: Android sensor type
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_flush(
    mut env: JNIEnv,
    _class: JClass,
    sensor_type: jint,
) -> jint {
    let result = flush_impl(sensor_type);
    status_result(&mut env, result)
}

fn flush_impl(sensor_type: jint) -> HwResult<()> {
    let kind = SensorKind::from_type_code(sensor_type)?;
    let hardware = get_hardware()?;
    hardware.registry.motion(kind).flush();
    Ok(())
}

/// JNI: Discard buffered location fixes
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsFlush(mut env: JNIEnv, _class: JClass) -> jint {
    let result = get_hardware().map(|hw| {
        hw.registry.location().flush();
    });
    status_result(&mut env, result)
}

/// JNI: Take all buffered motion samples as a JSON batch
/// Returns: JSON string or null on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_drainSensorJson(
    mut env: JNIEnv,
    _class: JClass,
    sensor_type: jint,
) -> jstring {
    let result = drain_sensor_json_impl(sensor_type);
    string_result(&mut env, result)
}

fn drain_sensor_json_impl(sensor_type: jint) -> HwResult<String> {
    let kind = SensorKind::from_type_code(sensor_type)?;
    let hardware = get_hardware()?;
    Ok(SensorBatch::drain(hardware.registry.motion(kind)).to_json()?)
}

/// JNI: Take all buffered location fixes as a JSON batch
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_drainLocationJson(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    let result = get_hardware()
        .and_then(|hw| Ok(LocationBatch::drain(hw.registry.location()).to_json()?));
    string_result(&mut env, result)
}

/// JNI: Last accuracy reported for a sensor (`SENSOR_STATUS_*` value)
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_lastAccuracy(
    mut env: JNIEnv,
    _class: JClass,
    sensor_type: jint,
) -> jint {
    let result = SensorKind::from_type_code(sensor_type)
        .and_then(|kind| Ok(get_hardware()?.registry.motion(kind).accuracy().as_raw()));
    match result {
        Ok(accuracy) => accuracy,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            SensorAccuracy::Unreliable.as_raw()
        }
    }
}

/// JNI: Selected location provider name, or "" when none
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsProvider(mut env: JNIEnv, _class: JClass) -> jstring {
    let result = get_hardware().map(|hw| {
        hw.registry
            .location()
            .provider()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    });
    string_result(&mut env, result)
}

/// JNI: Last provider status string
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsStatus(mut env: JNIEnv, _class: JClass) -> jstring {
    let result = get_hardware().map(|hw| hw.registry.location().status());
    string_result(&mut env, result)
}

/// JNI: Providers seen at the last refresh, as a JSON array
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_gpsProvidersJson(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    let result = get_hardware().and_then(|hw| {
        Ok(serde_json::to_string(&hw.registry.location().available_providers())?)
    });
    string_result(&mut env, result)
}

/// JNI: Get pending sample counts [accel, linear accel, gyro, location]
/// Returns: jintArray with 4 elements
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_sampleCounts(
    mut env: JNIEnv,
    _class: JClass,
) -> jintArray {
    let counts = match get_hardware() {
        Ok(hw) => hw.registry.sample_counts().as_array(),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            return std::ptr::null_mut();
        }
    };

    match env.new_int_array(counts.len() as i32) {
        Ok(arr) => {
            let _ = env.set_int_array_region(&arr, 0, &counts);
            arr.into_raw()
        }
        Err(_) => std::ptr::null_mut(),
    }
}

/// JNI callback: `SensorEventListener.onSensorChanged`
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_nativeOnSensorChanged(
    _env: JNIEnv,
    _class: JClass,
    sensor_type: jint,
    timestamp: jlong,
    x: jfloat,
    y: jfloat,
    z: jfloat,
    accuracy: jint,
) {
    let Ok(kind) = SensorKind::from_type_code(sensor_type) else {
        warn!("Dropping event for unknown sensor type {}", sensor_type);
        return;
    };
    let Ok(hardware) = get_hardware() else {
        return;
    };

    let sample = SensorSample::new(
        kind,
        timestamp,
        x as f64,
        y as f64,
        z as f64,
        SensorAccuracy::from_raw(accuracy),
    );
    hardware.platform.listeners().dispatch_sensor(sample);
}

/// JNI callback: `SensorEventListener.onAccuracyChanged`
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_nativeOnAccuracyChanged(
    _env: JNIEnv,
    _class: JClass,
    sensor_type: jint,
    accuracy: jint,
) {
    let (Ok(kind), Ok(hardware)) = (SensorKind::from_type_code(sensor_type), get_hardware()) else {
        return;
    };
    hardware
        .platform
        .listeners()
        .dispatch_accuracy(kind, SensorAccuracy::from_raw(accuracy));
}

/// JNI callback: `LocationListener.onLocationChanged`
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_nativeOnLocationChanged(
    mut env: JNIEnv,
    _class: JClass,
    provider: JString,
    time: jlong,
    latitude: jdouble,
    longitude: jdouble,
    altitude: jdouble,
    accuracy: jfloat,
    speed: jfloat,
    bearing: jfloat,
) {
    let Ok(hardware) = get_hardware() else {
        return;
    };
    let provider = read_java_string(&mut env, &provider).unwrap_or_default();

    let sample = LocationSample::new(
        provider,
        time,
        latitude,
        longitude,
        altitude,
        accuracy as f64,
        speed as f64,
        bearing as f64,
    );
    hardware.platform.listeners().dispatch_location(sample);
}

/// JNI callback: `LocationListener.onStatusChanged`
#[no_mangle]
pub extern "C" fn Java_org_rss_Hardware_nativeOnStatusChanged(
    mut env: JNIEnv,
    _class: JClass,
    status: JString,
) {
    let Ok(hardware) = get_hardware() else {
        return;
    };
    match read_java_string(&mut env, &status) {
        Ok(status) => {
            hardware.platform.listeners().dispatch_status(&status);
        }
        Err(e) => warn!("Unreadable location status: {}", e),
    }
}
