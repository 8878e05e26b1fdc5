use crate::error::{NotifyError, Result};
use crate::plugin::ChannelPlugin;
use crate::report_template::ReportRenderer;
use crate::utils::{truncate_string, MAX_BODY_LENGTH};
use crate::NotificationChannel;
use async_trait::async_trait;
use critmon_common::report::Report;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// POSTs the report as JSON to every recipient URL.
pub struct WebhookChannel {
    instance_id: String,
    client: reqwest::Client,
    urls: Vec<String>,
}

impl WebhookChannel {
    pub fn new(instance_id: &str, urls: Vec<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            instance_id: instance_id.to_string(),
            client,
            urls,
        })
    }

    pub(crate) fn render_body(report: &Report) -> Value {
        serde_json::json!({
            "report_id": report.id,
            "kind": report.kind,
            "window_start": report.window_start.to_rfc3339(),
            "window_label": report.window_label,
            "interval": report.interval.to_string(),
            "heading": ReportRenderer::heading(report),
            "total": report.tree.total(),
            "tree": report.tree,
        })
    }

    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<()> {
        let mut last_err = None;
        for attempt in 0..3u32 {
            match self.client.post(url).json(body).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let text = match resp.text().await {
                        Ok(text) => truncate_string(&text, MAX_BODY_LENGTH),
                        Err(e) => format!("[Failed to read response body: {e}]"),
                    };
                    tracing::warn!(
                        attempt = attempt + 1,
                        status,
                        "Webhook returned non-success status, retrying"
                    );
                    last_err = Some(NotifyError::ApiError {
                        service: "webhook".to_string(),
                        status,
                        body: text,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "Webhook send failed, retrying");
                    last_err = Some(e.into());
                }
            }
            if attempt < 2 {
                tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt))).await;
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, report: &Report) -> Result<()> {
        let body = Self::render_body(report);
        let mut failed = 0usize;

        for url in &self.urls {
            if let Err(e) = self.post_with_retry(url, &body).await {
                tracing::error!(url = %url, error = %e, "Webhook failed after 3 attempts");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(NotifyError::PartialDelivery {
                failed,
                total: self.urls.len(),
            });
        }
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "webhook"
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

// Plugin

#[derive(Deserialize)]
struct WebhookConfig {
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn parse_config(config: &Value) -> Result<WebhookConfig> {
    let config = if config.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        config.clone()
    };
    serde_json::from_value(config)
        .map_err(|e| NotifyError::InvalidConfig(format!("webhook: {e}")))
}

pub struct WebhookPlugin;

impl ChannelPlugin for WebhookPlugin {
    fn name(&self) -> &str {
        "webhook"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        parse_config(config).map(|_| ())
    }

    fn create_channel(
        &self,
        instance_id: &str,
        config: &Value,
        recipients: &[String],
    ) -> Result<Box<dyn NotificationChannel>> {
        if recipients.is_empty() {
            return Err(NotifyError::InvalidConfig(format!(
                "webhook '{instance_id}' has no recipient URLs"
            )));
        }
        let cfg = parse_config(config)?;
        Ok(Box::new(WebhookChannel::new(
            instance_id,
            recipients.to_vec(),
            Duration::from_secs(cfg.timeout_secs),
        )?))
    }
}
