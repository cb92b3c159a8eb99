//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and the
//! drivers. Binaries read environment variables and hand the raw values to the
//! `*_from_env_value` helpers below; nothing in this crate touches the process environment.

use crate::constants::{
    DEFAULT_CONNECTOR_INTERVAL_MS, DEFAULT_INGEST_INTERVAL_MAX_MS, DEFAULT_INGEST_INTERVAL_MIN_MS,
    DEFAULT_REQUEST_CAPACITY, MIN_REQUEST_CAPACITY,
};
use crate::{HubError, HubResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    request_capacity: usize,
    persist_path: Option<PathBuf>,
    ingest_interval_min: Duration,
    ingest_interval_max: Duration,
    connector_interval: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            request_capacity: DEFAULT_REQUEST_CAPACITY,
            persist_path: None,
            ingest_interval_min: Duration::from_millis(DEFAULT_INGEST_INTERVAL_MIN_MS),
            ingest_interval_max: Duration::from_millis(DEFAULT_INGEST_INTERVAL_MAX_MS),
            connector_interval: Duration::from_millis(DEFAULT_CONNECTOR_INTERVAL_MS),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default timer intervals.
    ///
    /// A capacity below [`MIN_REQUEST_CAPACITY`] is clamped up to it and logged.
    pub fn new(request_capacity: usize, persist_path: Option<PathBuf>) -> Self {
        Self {
            request_capacity: clamp_capacity(request_capacity as i128),
            persist_path,
            ..Self::default()
        }
    }

    /// Replace the ingestion interval bounds.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidConfig`] if `min` is zero or greater than `max`.
    pub fn with_ingest_interval(mut self, min: Duration, max: Duration) -> HubResult<Self> {
        if min.is_zero() || min > max {
            return Err(HubError::InvalidConfig(format!(
                "ingest interval must satisfy 0 < min <= max, got {}ms..{}ms",
                min.as_millis(),
                max.as_millis()
            )));
        }
        self.ingest_interval_min = min;
        self.ingest_interval_max = max;
        Ok(self)
    }

    /// Replace the connector ping interval.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidConfig`] if `interval` is zero.
    pub fn with_connector_interval(mut self, interval: Duration) -> HubResult<Self> {
        if interval.is_zero() {
            return Err(HubError::InvalidConfig(
                "connector interval must be greater than zero".into(),
            ));
        }
        self.connector_interval = interval;
        Ok(self)
    }

    pub fn request_capacity(&self) -> usize {
        self.request_capacity
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    pub fn ingest_interval_min(&self) -> Duration {
        self.ingest_interval_min
    }

    pub fn ingest_interval_max(&self) -> Duration {
        self.ingest_interval_max
    }

    pub fn connector_interval(&self) -> Duration {
        self.connector_interval
    }
}

/// Clamp a requested capacity to `MIN_REQUEST_CAPACITY..=usize::MAX`, logging any change.
pub fn clamp_capacity(requested: i128) -> usize {
    if requested < MIN_REQUEST_CAPACITY as i128 {
        tracing::warn!(
            requested = %requested,
            clamped = MIN_REQUEST_CAPACITY,
            "request capacity below minimum; clamping"
        );
        return MIN_REQUEST_CAPACITY;
    }
    usize::try_from(requested).unwrap_or(usize::MAX)
}

/// Parse the request capacity from an optional string value.
///
/// `None` or blank yields [`DEFAULT_REQUEST_CAPACITY`]. Zero and negative values are clamped.
///
/// # Errors
///
/// Returns [`HubError::InvalidConfig`] if the value is not an integer.
pub fn capacity_from_env_value(value: Option<String>) -> HubResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    match value {
        None => Ok(DEFAULT_REQUEST_CAPACITY),
        Some(v) => v
            .parse::<i128>()
            .map(clamp_capacity)
            .map_err(|e| HubError::InvalidConfig(format!("invalid request capacity '{v}': {e}"))),
    }
}

/// Parse a millisecond duration from an optional string value, falling back to `default_ms`.
///
/// # Errors
///
/// Returns [`HubError::InvalidConfig`] if the value is not a non-negative integer.
pub fn millis_from_env_value(
    name: &str,
    value: Option<String>,
    default_ms: u64,
) -> HubResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let ms = match value {
        None => default_ms,
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| HubError::InvalidConfig(format!("invalid {name} '{v}': {e}")))?,
    };
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.request_capacity(), 100);
        assert_eq!(cfg.ingest_interval_min(), Duration::from_secs(3));
        assert_eq!(cfg.ingest_interval_max(), Duration::from_secs(5));
        assert_eq!(cfg.connector_interval(), Duration::from_secs(5));
        assert!(cfg.persist_path().is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(CoreConfig::new(0, None).request_capacity(), 1);
        assert_eq!(clamp_capacity(-20), 1);
        assert_eq!(clamp_capacity(3), 3);
    }

    #[test]
    fn capacity_env_value_parsing() {
        assert_eq!(capacity_from_env_value(None).expect("default"), 100);
        assert_eq!(capacity_from_env_value(Some("  ".into())).expect("blank"), 100);
        assert_eq!(capacity_from_env_value(Some("50".into())).expect("50"), 50);
        assert_eq!(capacity_from_env_value(Some("-5".into())).expect("clamped"), 1);
        assert!(matches!(
            capacity_from_env_value(Some("lots".into())),
            Err(HubError::InvalidConfig(_))
        ));
    }

    #[test]
    fn interval_validation() {
        let cfg = CoreConfig::default()
            .with_ingest_interval(Duration::from_millis(10), Duration::from_millis(20))
            .expect("valid");
        assert_eq!(cfg.ingest_interval_max(), Duration::from_millis(20));

        assert!(CoreConfig::default()
            .with_ingest_interval(Duration::from_millis(30), Duration::from_millis(20))
            .is_err());
        assert!(CoreConfig::default()
            .with_connector_interval(Duration::ZERO)
            .is_err());
    }

    #[test]
    fn millis_env_value_parsing() {
        assert_eq!(
            millis_from_env_value("HUB_X", None, 250).expect("default"),
            Duration::from_millis(250)
        );
        assert_eq!(
            millis_from_env_value("HUB_X", Some("1200".into()), 250).expect("value"),
            Duration::from_millis(1200)
        );
        let err = millis_from_env_value("HUB_X", Some("-1".into()), 250).expect_err("negative");
        assert!(err.to_string().contains("HUB_X"));
    }
}
