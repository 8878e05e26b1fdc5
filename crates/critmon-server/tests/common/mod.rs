#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use critmon_common::record::RawRecord;
use critmon_common::report::Report;
use critmon_notify::error::Result as NotifyResult;
use critmon_notify::manager::NotificationManager;
use critmon_notify::routing::ChannelRoute;
use critmon_notify::NotificationChannel;
use critmon_server::feed::{FeedPoll, RecordFeed};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
}

pub fn record(title: &str, description: &str, exception: Option<&str>, ts: DateTime<Utc>) -> RawRecord {
    RawRecord {
        timestamp: Some(ts),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        params: None,
        exception: exception.map(str::to_string),
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

/// Plays back a fixed script, then fails so the monitor loop returns.
pub struct ScriptedFeed {
    script: VecDeque<FeedPoll>,
    pub polls: usize,
}

impl ScriptedFeed {
    pub fn new(script: impl IntoIterator<Item = FeedPoll>) -> Self {
        Self {
            script: script.into_iter().collect(),
            polls: 0,
        }
    }

    pub fn records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        Self::new(records.into_iter().map(FeedPoll::Record))
    }
}

#[async_trait]
impl RecordFeed for ScriptedFeed {
    async fn next_record(&mut self) -> Result<FeedPoll> {
        self.polls += 1;
        self.script
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("feed exhausted"))
    }
}

pub struct CapturingChannel {
    reports: Arc<Mutex<Vec<Report>>>,
}

#[async_trait]
impl NotificationChannel for CapturingChannel {
    async fn send(&self, report: &Report) -> NotifyResult<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "capture"
    }

    fn instance_id(&self) -> &str {
        "capture"
    }
}

/// Manager with one channel that records every report it receives.
pub fn capturing_manager() -> (NotificationManager, Arc<Mutex<Vec<Report>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let channel = CapturingChannel {
        reports: Arc::clone(&reports),
    };
    let manager = NotificationManager::new(vec![Box::new(channel)], vec![ChannelRoute::all(0)]);
    (manager, reports)
}
