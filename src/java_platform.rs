//! Platform services backed by the `org.rss.Hardware` Java shim.
//!
//! The shim owns the real Android `SensorEventListener` and
//! `LocationListener` objects. Control calls go Rust -> Java through static
//! methods on the shim class; listener callbacks come back Java -> Rust through
//! the `nativeOn*` exports in `android_jni`, which route them through this
//! platform's listener table.

use std::sync::Arc;

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JThrowable, JValue};
use jni::{JNIEnv, JavaVM};
use log::debug;

use crate::error::{HardwareError, HwResult};
use crate::platform::{
    ListenerTable, LocationListener, LocationRequest, LocationService, SensorListener,
    SensorService,
};
use crate::sample::{SamplingRate, SensorKind};

pub struct JavaPlatform {
    vm: JavaVM,
    class: GlobalRef,
    listeners: ListenerTable,
}

impl JavaPlatform {
    /// `class` must be the shim class the native methods are declared on
    pub fn new(env: &mut JNIEnv, class: &JClass) -> HwResult<Self> {
        Ok(Self {
            vm: env.get_java_vm()?,
            class: env.new_global_ref(class)?,
            listeners: ListenerTable::new(),
        })
    }

    /// Table the `nativeOn*` callbacks dispatch through
    pub fn listeners(&self) -> &ListenerTable {
        &self.listeners
    }

    fn with_env<R>(
        &self,
        call: &str,
        f: impl FnOnce(&mut JNIEnv, &JClass<'static>) -> jni::errors::Result<R>,
    ) -> HwResult<R> {
        let mut guard = self.vm.attach_current_thread()?;
        let env: &mut JNIEnv = &mut guard;
        let class: &JClass<'static> = self.class.as_obj().into();

        f(&mut *env, class).map_err(|e| java_failure(env, call, e))
    }
}

/// Convert a failed call, clearing and describing any pending Java exception
fn java_failure(env: &mut JNIEnv, call: &str, err: jni::errors::Error) -> HardwareError {
    if !matches!(err, jni::errors::Error::JavaException) {
        return HardwareError::Jni(format!("{}: {}", call, err));
    }

    let description = match env.exception_occurred() {
        Ok(throwable) => {
            let _ = env.exception_clear();
            describe_throwable(env, &throwable).unwrap_or_else(|| "unknown exception".to_string())
        }
        Err(_) => "unknown exception".to_string(),
    };
    HardwareError::Platform(format!("{} threw {}", call, description))
}

fn describe_throwable(env: &mut JNIEnv, throwable: &JThrowable) -> Option<String> {
    let text = env
        .call_method(throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .ok()?;
    let text = JString::from(text);
    let description: String = env.get_string(&text).ok()?.into();
    Some(description)
}

fn read_string_array(env: &mut JNIEnv, array: JObject) -> jni::errors::Result<Vec<String>> {
    if array.is_null() {
        return Ok(Vec::new());
    }

    let array = JObjectArray::from(array);
    let len = env.get_array_length(&array)?;
    let mut strings = Vec::with_capacity(len as usize);

    for i in 0..len {
        let element = env.get_object_array_element(&array, i)?;
        if element.is_null() {
            continue;
        }
        let element = JString::from(element);
        strings.push(env.get_string(&element)?.into());
        env.delete_local_ref(element)?;
    }

    Ok(strings)
}

impl SensorService for JavaPlatform {
    fn has_default_sensor(&self, kind: SensorKind) -> HwResult<bool> {
        self.with_env("hasSensor", |env, class| {
            env.call_static_method(class, "hasSensor", "(I)Z", &[JValue::Int(kind.type_code())])?
                .z()
        })
    }

    fn register_listener(
        &self,
        kind: SensorKind,
        listener: Arc<dyn SensorListener>,
        rate: SamplingRate,
    ) -> HwResult<()> {
        // Route callbacks before Java starts delivering them
        self.listeners.set_sensor(kind, listener);

        let accepted = self.with_env("registerSensor", |env, class| {
            env.call_static_method(
                class,
                "registerSensor",
                "(II)Z",
                &[JValue::Int(kind.type_code()), JValue::Int(rate.delay_code())],
            )?
            .z()
        });

        match accepted {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.listeners.clear_sensor(kind);
                Err(HardwareError::Platform(format!(
                    "SensorManager refused listener for {}",
                    kind
                )))
            }
            Err(e) => {
                self.listeners.clear_sensor(kind);
                Err(e)
            }
        }
    }

    fn unregister_listener(&self, kind: SensorKind) -> HwResult<()> {
        self.with_env("unregisterSensor", |env, class| {
            env.call_static_method(class, "unregisterSensor", "(I)V", &[JValue::Int(kind.type_code())])?
                .v()
        })?;
        self.listeners.clear_sensor(kind);
        Ok(())
    }
}

impl LocationService for JavaPlatform {
    fn all_providers(&self) -> HwResult<Vec<String>> {
        self.with_env("allProviders", |env, class| {
            let array = env
                .call_static_method(class, "allProviders", "()[Ljava/lang/String;", &[])?
                .l()?;
            read_string_array(env, array)
        })
    }

    fn request_location_updates(
        &self,
        request: &LocationRequest,
        listener: Arc<dyn LocationListener>,
    ) -> HwResult<()> {
        self.listeners.set_location(listener);

        let min_time_ms = i64::try_from(request.min_time_ms).map_err(|_| {
            HardwareError::InvalidConfig(format!(
                "min_time_ms {} does not fit a Java long",
                request.min_time_ms
            ))
        })?;

        let result = self.with_env("requestLocationUpdates", |env, class| {
            let provider = env.new_string(request.provider.as_str())?;
            env.call_static_method(
                class,
                "requestLocationUpdates",
                "(Ljava/lang/String;JF)V",
                &[
                    JValue::Object(&provider),
                    JValue::Long(min_time_ms),
                    JValue::Float(request.min_distance_m),
                ],
            )?
            .v()
        });

        if result.is_err() {
            self.listeners.clear_location();
        } else {
            debug!("Requested location updates: {:?}", request);
        }
        result
    }

    fn remove_updates(&self) -> HwResult<()> {
        self.with_env("removeLocationUpdates", |env, class| {
            env.call_static_method(class, "removeLocationUpdates", "()V", &[])?
                .v()
        })?;
        self.listeners.clear_location();
        Ok(())
    }
}
