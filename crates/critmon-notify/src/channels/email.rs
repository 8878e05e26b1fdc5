use crate::error::{NotifyError, Result};
use crate::plugin::ChannelPlugin;
use crate::report_template::ReportRenderer;
use crate::NotificationChannel;
use async_trait::async_trait;
use critmon_common::report::{Report, ReportKind};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use serde_json::Value;

/// Sends the HTML rendering of each report to a fixed list of mailboxes.
///
/// Talks plain SMTP to a relay on a trusted network.
pub struct EmailChannel {
    instance_id: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    recipients: Vec<String>,
    summary_subject: String,
    alert_subject: String,
}

impl EmailChannel {
    fn new(instance_id: &str, cfg: EmailConfig, recipients: Vec<String>) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.smtp_host).port(cfg.smtp_port);

        if let (Some(user), Some(pass)) = (cfg.smtp_username, cfg.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Self {
            instance_id: instance_id.to_string(),
            transport: builder.build(),
            from: cfg.from,
            recipients,
            summary_subject: cfg.summary_subject,
            alert_subject: cfg.alert_subject,
        }
    }

    fn subject(&self, report: &Report) -> &str {
        match report.kind {
            ReportKind::Summary => &self.summary_subject,
            ReportKind::Violation => &self.alert_subject,
        }
    }

    fn build_message(&self, recipient: &str, subject: &str, body: &str) -> Result<Message> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| NotifyError::InvalidConfig(format!("from address '{}': {e}", self.from)))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| NotifyError::InvalidConfig(format!("recipient '{recipient}': {e}")))?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| NotifyError::SmtpError(e.to_string()))
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, report: &Report) -> Result<()> {
        let subject = self.subject(report);
        let body = ReportRenderer::render_html(report);
        let mut failed = 0usize;

        for recipient in &self.recipients {
            let email = self.build_message(recipient, subject, &body)?;

            let mut last_err = None;
            for attempt in 0..3u32 {
                match self.transport.send(email.clone()).await {
                    Ok(_) => {
                        last_err = None;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            recipient = %recipient,
                            error = %e,
                            "Email send failed, retrying"
                        );
                        last_err = Some(e);
                        if attempt < 2 {
                            tokio::time::sleep(std::time::Duration::from_millis(
                                100 * 2u64.pow(attempt),
                            ))
                            .await;
                        }
                    }
                }
            }

            if let Some(e) = last_err {
                tracing::error!(recipient = %recipient, error = %e, "Email send failed after 3 attempts");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(NotifyError::PartialDelivery {
                failed,
                total: self.recipients.len(),
            });
        }
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "email"
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

// Plugin

#[derive(Deserialize)]
struct EmailConfig {
    smtp_host: String,
    #[serde(default = "default_smtp_port")]
    smtp_port: u16,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    from: String,
    #[serde(default = "default_summary_subject")]
    summary_subject: String,
    #[serde(default = "default_alert_subject")]
    alert_subject: String,
}

fn default_smtp_port() -> u16 {
    25
}

fn default_summary_subject() -> String {
    "CRITICAL LOG SUMMARY".to_string()
}

fn default_alert_subject() -> String {
    "CRITICAL LOG ALERT".to_string()
}

fn parse_config(config: &Value) -> Result<EmailConfig> {
    serde_json::from_value(config.clone())
        .map_err(|e| NotifyError::InvalidConfig(format!("email: {e}")))
}

pub struct EmailPlugin;

impl ChannelPlugin for EmailPlugin {
    fn name(&self) -> &str {
        "email"
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
                "email '{instance_id}' has no recipients"
            )));
        }
        let cfg = parse_config(config)?;
        Ok(Box::new(EmailChannel::new(instance_id, cfg, recipients.to_vec())))
    }

    fn redact_config(&self, config: &Value) -> Value {
        let mut redacted = config.clone();
        if let Some(obj) = redacted.as_object_mut() {
            if obj.contains_key("smtp_password") {
                obj.insert(
                    "smtp_password".to_string(),
                    Value::String("***".to_string()),
                );
            }
        }
        redacted
    }
}
