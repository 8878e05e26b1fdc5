use crate::feed::{FeedPoll, RecordFeed};
use chrono::{DateTime, Utc};
use critmon_alert::config::MonitorConfig;
use critmon_alert::engine::AggregationEngine;
use critmon_notify::manager::NotificationManager;

/// Single consumer of the feed.
///
/// Polls the feed, hands each record to the engine, delivers whatever
/// reports come back, and pauses after every window rotation. Returns only
/// when the feed fails.
pub async fn run_monitor<F: RecordFeed>(
    feed: &mut F,
    engine: &mut AggregationEngine,
    notifier: &NotificationManager,
    config: &MonitorConfig,
) -> anyhow::Result<()> {
    run_monitor_with_clock(feed, engine, notifier, config, Utc::now).await
}

/// [`run_monitor`] with the wall clock supplied by the caller.
pub async fn run_monitor_with_clock<F, C>(
    feed: &mut F,
    engine: &mut AggregationEngine,
    notifier: &NotificationManager,
    config: &MonitorConfig,
    clock: C,
) -> anyhow::Result<()>
where
    F: RecordFeed,
    C: Fn() -> DateTime<Utc>,
{
    tracing::info!(
        period_secs = config.period_secs,
        alert_threshold = config.alert_threshold,
        staleness_secs = config.staleness_secs,
        "Monitor loop starting"
    );

    loop {
        let raw = match feed.next_record().await? {
            FeedPoll::Record(raw) => raw,
            FeedPoll::Empty => {
                tracing::trace!("Feed idle");
                tokio::time::sleep(config.retry_delay()).await;
                continue;
            }
        };

        let outcome = engine.ingest(&raw, clock());
        let rotated = outcome.rotated();

        for report in outcome.into_reports() {
            tracing::info!(
                report_id = %report.id,
                kind = %report.kind,
                window = %report.window_label,
                records = report.tree.total(),
                "Emitting report"
            );
            notifier.notify(&report).await;
        }

        if rotated {
            tokio::time::sleep(config.rotation_pause()).await;
        }
    }
}
