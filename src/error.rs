use jni::JNIEnv;
use thiserror::Error;

/// Hardware bridge error types
#[derive(Error, Debug, Clone)]
pub enum HardwareError {
    #[error("Platform call failed: {0}")]
    Platform(String),

    #[error("Unknown sensor type: {0}")]
    UnknownSensor(i32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Hardware bridge not initialized")]
    NotInitialized,

    #[error("JNI error: {0}")]
    Jni(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for bridge operations
pub type HwResult<T> = Result<T, HardwareError>;

impl From<jni::errors::Error> for HardwareError {
    fn from(err: jni::errors::Error) -> Self {
        HardwareError::Jni(err.to_string())
    }
}

impl From<serde_json::Error> for HardwareError {
    fn from(err: serde_json::Error) -> Self {
        HardwareError::Internal(format!("JSON serialization failed: {}", err))
    }
}

/// Java exception class used to report `error` to the host
pub fn exception_class(error: &HardwareError) -> &'static str {
    match error {
        HardwareError::NotInitialized => "java/lang/IllegalStateException",
        HardwareError::UnknownSensor(_) | HardwareError::InvalidConfig(_) => {
            "java/lang/IllegalArgumentException"
        }
        HardwareError::Platform(_) => "java/io/IOException",
        HardwareError::Jni(_) | HardwareError::Internal(_) => "java/lang/RuntimeException",
    }
}

/// Throw Java exception from Rust error
pub fn throw_java_exception(env: &mut JNIEnv, error: &HardwareError) -> HwResult<()> {
    // A pending exception from a failed JNI call would make throw_new fail
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }

    env.throw_new(exception_class(error), error.to_string())
        .map_err(|_| HardwareError::Jni("Failed to throw exception".to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_mapping() {
        assert_eq!(
            exception_class(&HardwareError::NotInitialized),
            "java/lang/IllegalStateException"
        );
        assert_eq!(
            exception_class(&HardwareError::UnknownSensor(99)),
            "java/lang/IllegalArgumentException"
        );
        assert_eq!(
            exception_class(&HardwareError::Platform("gone".into())),
            "java/io/IOException"
        );
    }

    #[test]
    fn test_jni_failures_map_to_jni_variant() {
        let err = HardwareError::from(jni::errors::Error::NullPtr("env"));
        assert!(matches!(err, HardwareError::Jni(_)));
        assert_eq!(exception_class(&err), "java/lang/RuntimeException");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HardwareError::UnknownSensor(7).to_string(),
            "Unknown sensor type: 7"
        );
    }
}
