use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, HwResult};
use crate::sample::{LocationProvider, SamplingRate};

/// Bridge configuration, passed as JSON from the host at init.
/// Every field is optional; omitted fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub sampling_rate: SamplingRate,
    /// Initial capacity of each motion buffer, re-reserved after every flush
    pub sensor_buffer_capacity: usize,
    pub location_buffer_capacity: usize,
    pub location: LocationConfig,
    pub log_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub min_time_ms: u64,
    pub min_distance_m: f32,
    /// Most preferred first
    pub provider_priority: Vec<LocationProvider>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            sampling_rate: SamplingRate::Fastest,
            sensor_buffer_capacity: 500,
            location_buffer_capacity: 100,
            location: LocationConfig::default(),
            log_tag: "RssHardware".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            min_time_ms: 10,
            min_distance_m: 0.1,
            provider_priority: vec![
                LocationProvider::Fused,
                LocationProvider::Gps,
                LocationProvider::Network,
            ],
        }
    }
}

impl HardwareConfig {
    /// Parse and validate; blank input yields the defaults
    pub fn from_json(json: &str) -> HwResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: HardwareConfig = serde_json::from_str(json)
            .map_err(|e| HardwareError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HwResult<()> {
        let location = &self.location;

        if i64::try_from(location.min_time_ms).is_err() {
            return Err(HardwareError::InvalidConfig(format!(
                "min_time_ms {} exceeds the platform's maximum interval",
                location.min_time_ms
            )));
        }

        if !location.min_distance_m.is_finite() || location.min_distance_m < 0.0 {
            return Err(HardwareError::InvalidConfig(format!(
                "min_distance_m must be a non-negative number, got {}",
                location.min_distance_m
            )));
        }

        if location.provider_priority.is_empty() {
            return Err(HardwareError::InvalidConfig(
                "provider_priority must name at least one provider".to_string(),
            ));
        }

        for (i, provider) in location.provider_priority.iter().enumerate() {
            if location.provider_priority[..i].contains(provider) {
                return Err(HardwareError::InvalidConfig(format!(
                    "provider '{}' listed twice in provider_priority",
                    provider
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_config_is_default() {
        assert_eq!(HardwareConfig::from_json("").unwrap(), HardwareConfig::default());
        assert_eq!(HardwareConfig::from_json("  ").unwrap(), HardwareConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config =
            HardwareConfig::from_json(r#"{"sampling_rate": "game", "location": {"min_time_ms": 500}}"#)
                .unwrap();

        assert_eq!(config.sampling_rate, SamplingRate::Game);
        assert_eq!(config.location.min_time_ms, 500);
        assert_eq!(config.location.min_distance_m, 0.1);
        assert_eq!(config.location.provider_priority.len(), 3);
    }

    #[test]
    fn test_largest_interval_accepted() {
        let config =
            HardwareConfig::from_json(r#"{"location": {"min_time_ms": 9223372036854775807}}"#)
                .unwrap();
        assert_eq!(config.location.min_time_ms, i64::MAX as u64);
    }

    #[test]
    fn test_custom_priority() {
        let config =
            HardwareConfig::from_json(r#"{"location": {"provider_priority": ["gps", "network"]}}"#)
                .unwrap();
        assert_eq!(
            config.location.provider_priority,
            vec![LocationProvider::Gps, LocationProvider::Network]
        );
    }

    #[test]
    fn test_invalid_configs() {
        assert!(HardwareConfig::from_json("{not json").is_err());
        assert!(HardwareConfig::from_json(r#"{"location": {"provider_priority": []}}"#).is_err());
        assert!(
            HardwareConfig::from_json(r#"{"location": {"provider_priority": ["gps", "gps"]}}"#)
                .is_err()
        );
        assert!(HardwareConfig::from_json(r#"{"location": {"min_distance_m": -1.0}}"#).is_err());
        assert!(
            HardwareConfig::from_json(r#"{"location": {"min_time_ms": 9223372036854775808}}"#)
                .is_err()
        );
        assert!(HardwareConfig::from_json(r#"{"location": {"provider_priority": ["passive"]}}"#).is_err());
    }
}
