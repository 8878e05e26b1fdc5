use crate::error::Result;
use crate::plugin::ChannelPlugin;
use crate::report_template::ReportRenderer;
use crate::NotificationChannel;
use async_trait::async_trait;
use critmon_common::report::Report;
use serde_json::Value;

/// Writes the text rendering of each report to the tracing output.
pub struct LogChannel {
    instance_id: String,
}

impl LogChannel {
    pub fn new(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
        }
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, report: &Report) -> Result<()> {
        tracing::info!(
            instance = %self.instance_id,
            report_id = %report.id,
            kind = %report.kind,
            records = report.tree.total(),
            "\n{}",
            ReportRenderer::render_text(report)
        );
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "log"
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

pub struct LogPlugin;

impl ChannelPlugin for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn create_channel(
        &self,
        instance_id: &str,
        _config: &Value,
        _recipients: &[String],
    ) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(LogChannel::new(instance_id)))
    }
}
