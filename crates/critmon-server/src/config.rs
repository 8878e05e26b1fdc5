use anyhow::Context;
use critmon_alert::config::MonitorConfig;
use critmon_common::report::ReportKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    pub feed: FeedConfig,
    /// When empty, reports go to a single log channel.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON-lines file the producer appends critical records to.
    pub path: String,
    /// Number of trailing records replayed at startup.
    #[serde(default = "default_backlog")]
    pub backlog: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub channel_type: String,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ReportKind>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Channel-specific settings, validated by the channel plugin.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

fn default_backlog() -> usize {
    1000
}

fn default_kinds() -> Vec<ReportKind> {
    vec![ReportKind::Summary, ReportKind::Violation]
}

fn default_enabled() -> bool {
    true
}

impl AppConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file '{path}'"))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.monitor.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}
