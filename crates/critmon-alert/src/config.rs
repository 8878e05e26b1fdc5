use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the aggregation engine and its polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Window length in seconds, measured on record timestamps.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// An exception alerts once its count exceeds this value.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u64,
    /// Reports for windows that started longer ago than this are dropped.
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
    /// Delay before polling an empty feed again.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Pause after each window rotation.
    #[serde(default = "default_rotation_pause_ms")]
    pub rotation_pause_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            alert_threshold: default_alert_threshold(),
            staleness_secs: default_staleness_secs(),
            retry_delay_ms: default_retry_delay_ms(),
            rotation_pause_ms: default_rotation_pause_ms(),
        }
    }
}

impl MonitorConfig {
    /// Rejects values the engine cannot represent as a time span.
    pub fn validate(&self) -> Result<(), String> {
        if self.period_secs == 0 {
            return Err("monitor.period_secs must be greater than zero".to_string());
        }
        if checked_seconds(self.period_secs).is_none() {
            return Err(format!("monitor.period_secs {} is out of range", self.period_secs));
        }
        if checked_seconds(self.staleness_secs).is_none() {
            return Err(format!(
                "monitor.staleness_secs {} is out of range",
                self.staleness_secs
            ));
        }
        Ok(())
    }

    /// Saturates at [`chrono::Duration::MAX`] for values `validate` rejects.
    pub fn period(&self) -> chrono::Duration {
        checked_seconds(self.period_secs).unwrap_or(chrono::Duration::MAX)
    }

    pub fn staleness(&self) -> chrono::Duration {
        checked_seconds(self.staleness_secs).unwrap_or(chrono::Duration::MAX)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rotation_pause(&self) -> Duration {
        Duration::from_millis(self.rotation_pause_ms)
    }
}

fn checked_seconds(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

fn default_period_secs() -> u64 {
    30 * 60
}

fn default_alert_threshold() -> u64 {
    100
}

fn default_staleness_secs() -> u64 {
    2 * 60 * 60
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_rotation_pause_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MonitorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn huge_spans_are_rejected_without_panicking() {
        let config: MonitorConfig = toml::from_str("period_secs = 100000000000000000").unwrap();
        assert!(config.validate().unwrap_err().contains("period_secs"));
        assert_eq!(config.period(), chrono::Duration::MAX);

        let config = MonitorConfig {
            staleness_secs: u64::MAX,
            ..MonitorConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("staleness_secs"));
        assert_eq!(config.staleness(), chrono::Duration::MAX);
    }

    #[test]
    fn engine_builds_from_out_of_range_config() {
        let config = MonitorConfig {
            period_secs: i64::MAX as u64,
            ..MonitorConfig::default()
        };
        let engine = crate::engine::AggregationEngine::new(&config);
        assert!(engine.window().start().is_none());
    }
}
