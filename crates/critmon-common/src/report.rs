use crate::tree::CountTree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which trigger produced a report.
///
/// # Examples
///
/// ```
/// use critmon_common::report::ReportKind;
///
/// let kind: ReportKind = "violation".parse().unwrap();
/// assert_eq!(kind, ReportKind::Violation);
/// assert_eq!(ReportKind::Summary.to_string(), "summary");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// End-of-window digest of every category seen.
    Summary,
    /// Immediate alert for one exception crossing the threshold.
    Violation,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Summary => write!(f, "summary"),
            ReportKind::Violation => write!(f, "violation"),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(ReportKind::Summary),
            "violation" | "alert" => Ok(ReportKind::Violation),
            _ => Err(format!("unknown report kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ReportInterval {
    Every { minutes: u64 },
    Realtime,
}

impl std::fmt::Display for ReportInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportInterval::Every { minutes } => write!(f, "every {minutes} minutes"),
            ReportInterval::Realtime => write!(f, "realtime stream"),
        }
    }
}

/// Data handed to the notification sink. Rendering is left to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub kind: ReportKind,
    pub window_start: DateTime<Utc>,
    /// `HH:MM D Month YYYY` form of `window_start`.
    pub window_label: String,
    pub interval: ReportInterval,
    pub tree: CountTree,
}

impl Report {
    pub fn summary(window_start: DateTime<Utc>, period_secs: u64, tree: CountTree) -> Self {
        Self::new(
            ReportKind::Summary,
            window_start,
            ReportInterval::Every {
                minutes: period_secs / 60,
            },
            tree,
        )
    }

    pub fn violation(window_start: DateTime<Utc>, tree: CountTree) -> Self {
        Self::new(
            ReportKind::Violation,
            window_start,
            ReportInterval::Realtime,
            tree,
        )
    }

    fn new(
        kind: ReportKind,
        window_start: DateTime<Utc>,
        interval: ReportInterval,
        tree: CountTree,
    ) -> Self {
        Self {
            id: crate::id::next_id(),
            kind,
            window_start,
            window_label: window_label(window_start),
            interval,
            tree,
        }
    }
}

/// Formats a window start as `HH:MM D Month YYYY`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use critmon_common::report::window_label;
///
/// let ts = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap();
/// assert_eq!(window_label(ts), "09:05 7 March 2026");
/// ```
pub fn window_label(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M %-d %B %Y").to_string()
}
