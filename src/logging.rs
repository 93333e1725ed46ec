use std::sync::Once;

static INIT: Once = Once::new();

/// Route `log` output to logcat under `tag`. Only the first call has effect.
pub fn init_logging(tag: &str) {
    INIT.call_once(|| {
        #[cfg(target_os = "android")]
        {
            if android_log::init(tag.to_string()).is_ok() {
                log::set_max_level(log::LevelFilter::Debug);
            }
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = tag;
        }
    });
}
