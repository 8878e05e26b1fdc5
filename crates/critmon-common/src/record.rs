use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exception key used when a record carries no exception.
pub const NO_EXCEPTION: &str = "NA";

/// A critical log record as it arrives from the feed.
///
/// Every field is optional at this stage; the normalizer decides whether
/// the record is usable. The legacy short keys (`e0`, `e3`, `e4`, `e5`,
/// `e6`) are accepted as aliases so older producers keep working.
///
/// # Examples
///
/// ```
/// use critmon_common::record::RawRecord;
///
/// let raw: RawRecord = serde_json::from_str(
///     r#"{"e0":"2026-10-14T09:00:00Z","e3":"Checkout","e4":"Payment failed"}"#,
/// ).unwrap();
/// assert_eq!(raw.title.as_deref(), Some("Checkout"));
/// assert_eq!(raw.description.as_deref(), Some("Payment failed"));
/// assert!(raw.exception.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "e0")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Main heading of the log entry.
    #[serde(default, alias = "e3")]
    pub title: Option<String>,
    /// Sub-heading; records without one predate the current schema.
    #[serde(default, alias = "e4")]
    pub description: Option<String>,
    /// Request parameters or variables that help debugging. Not aggregated.
    #[serde(default, alias = "e5")]
    pub params: Option<serde_json::Value>,
    #[serde(default, alias = "e6")]
    pub exception: Option<String>,
}

/// A record that passed normalization: every key is sanitized and the
/// exception is filled with [`NO_EXCEPTION`] when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub exception: String,
}
