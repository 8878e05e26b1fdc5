use crate::channels::webhook::WebhookChannel;
use crate::error::{NotifyError, Result};
use crate::manager::NotificationManager;
use crate::plugin::ChannelRegistry;
use crate::routing::ChannelRoute;
use crate::NotificationChannel;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use critmon_common::report::{Report, ReportKind};
use critmon_common::tree::CountTree;
use std::sync::{Arc, Mutex};

struct RecordingChannel {
    name: String,
    fail: bool,
    seen: Arc<Mutex<Vec<ReportKind>>>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, report: &Report) -> Result<()> {
        self.seen.lock().unwrap().push(report.kind);
        if self.fail {
            return Err(NotifyError::SmtpError("connection refused".into()));
        }
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "recording"
    }

    fn instance_id(&self) -> &str {
        &self.name
    }
}

fn recording(name: &str, fail: bool) -> (Box<dyn NotificationChannel>, Arc<Mutex<Vec<ReportKind>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let channel = RecordingChannel {
        name: name.to_string(),
        fail,
        seen: Arc::clone(&seen),
    };
    (Box::new(channel), seen)
}

fn violation() -> Report {
    let start = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
    Report::violation(start, CountTree::single_path("Api", "NullPointer", "NA", 101))
}

fn summary() -> Report {
    let start = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
    let mut tree = CountTree::new();
    tree.update("Api", "NullPointer", "NA");
    Report::summary(start, 1800, tree)
}

#[test]
fn routing_filters_by_kind() {
    let alerts_only = ChannelRoute {
        kinds: vec![ReportKind::Violation],
        channel_index: 0,
    };
    assert!(alerts_only.should_send(ReportKind::Violation));
    assert!(!alerts_only.should_send(ReportKind::Summary));

    let all = ChannelRoute::all(1);
    assert!(all.should_send(ReportKind::Summary));
    assert!(all.should_send(ReportKind::Violation));
}

#[tokio::test]
async fn manager_delivers_only_to_matching_routes() {
    let (alerts, alerts_seen) = recording("alerts", false);
    let (digest, digest_seen) = recording("digest", false);
    let manager = NotificationManager::new(
        vec![alerts, digest],
        vec![
            ChannelRoute {
                kinds: vec![ReportKind::Violation],
                channel_index: 0,
            },
            ChannelRoute {
                kinds: vec![ReportKind::Summary],
                channel_index: 1,
            },
        ],
    );

    manager.notify(&violation()).await;
    manager.notify(&summary()).await;

    assert_eq!(*alerts_seen.lock().unwrap(), vec![ReportKind::Violation]);
    assert_eq!(*digest_seen.lock().unwrap(), vec![ReportKind::Summary]);
}

#[tokio::test]
async fn manager_continues_after_channel_failure() {
    let (broken, broken_seen) = recording("broken", true);
    let (healthy, healthy_seen) = recording("healthy", false);
    let manager = NotificationManager::new(
        vec![broken, healthy],
        vec![ChannelRoute::all(0), ChannelRoute::all(1), ChannelRoute::all(7)],
    );

    manager.notify(&violation()).await;

    assert_eq!(broken_seen.lock().unwrap().len(), 1);
    assert_eq!(healthy_seen.lock().unwrap().len(), 1);
}

#[test]
fn registry_rejects_unknown_type() {
    let registry = ChannelRegistry::default();
    let err = registry
        .create_channel("pager", "p1", &serde_json::json!({}), &[])
        .err()
        .unwrap();
    assert!(matches!(err, NotifyError::UnknownChannelType(t) if t == "pager"));
    assert_eq!(registry.plugin_names(), vec!["email", "log", "webhook"]);
}

#[test]
fn registry_builds_log_channel_without_config() {
    let registry = ChannelRegistry::default();
    let channel = registry
        .create_channel("log", "console", &serde_json::Value::Null, &[])
        .unwrap();
    assert_eq!(channel.channel_type(), "log");
    assert_eq!(channel.instance_id(), "console");
}

#[test]
fn email_config_requires_host_and_sender() {
    let registry = ChannelRegistry::default();
    let plugin = registry.get_plugin("email").unwrap();
    assert!(plugin
        .validate_config(&serde_json::json!({ "smtp_host": "localhost" }))
        .is_err());
    assert!(plugin
        .validate_config(&serde_json::json!({ "smtp_host": "localhost", "from": "ops@example.com" }))
        .is_ok());
}

#[tokio::test]
async fn email_channel_needs_recipients() {
    let registry = ChannelRegistry::default();
    let config = serde_json::json!({ "smtp_host": "localhost", "from": "ops@example.com" });
    let err = registry.create_channel("email", "mail", &config, &[]).err().unwrap();
    assert!(matches!(err, NotifyError::InvalidConfig(_)));

    let recipients = vec!["admin@example.com".to_string()];
    assert!(registry.create_channel("email", "mail", &config, &recipients).is_ok());
}

#[test]
fn email_redacts_password() {
    let registry = ChannelRegistry::default();
    let plugin = registry.get_plugin("email").unwrap();
    let redacted = plugin.redact_config(&serde_json::json!({
        "smtp_host": "localhost",
        "smtp_password": "hunter2",
    }));
    assert_eq!(redacted["smtp_password"], "***");
    assert_eq!(redacted["smtp_host"], "localhost");
}

#[test]
fn webhook_requires_recipient_urls() {
    let registry = ChannelRegistry::default();
    let err = registry
        .create_channel("webhook", "hook", &serde_json::Value::Null, &[])
        .err()
        .unwrap();
    assert!(matches!(err, NotifyError::InvalidConfig(_)));
    assert!(registry
        .get_plugin("webhook")
        .unwrap()
        .validate_config(&serde_json::json!({ "timeout_secs": "soon" }))
        .is_err());
}

#[test]
fn webhook_body_carries_report_contract() {
    let body = WebhookChannel::render_body(&violation());
    assert_eq!(body["kind"], "violation");
    assert_eq!(body["interval"], "realtime stream");
    assert_eq!(body["window_label"], "09:00 14 October 2026");
    assert_eq!(body["total"], 101);
    assert_eq!(body["tree"]["Api"]["descriptions"]["NullPointer"]["exceptions"]["NA"]["count"], 101);
}
