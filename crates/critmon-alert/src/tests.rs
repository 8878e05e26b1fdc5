use crate::config::MonitorConfig;
use crate::detector::{AlertedSet, ViolationDetector};
use crate::engine::{AggregationEngine, Ingest};
use chrono::{DateTime, Duration, TimeZone, Utc};
use critmon_common::record::RawRecord;
use critmon_common::report::{ReportInterval, ReportKind};
use critmon_common::tree::CountTree;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
}

fn make_record(title: &str, description: &str, exception: Option<&str>, secs: i64) -> RawRecord {
    RawRecord {
        timestamp: Some(t0() + Duration::seconds(secs)),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        params: None,
        exception: exception.map(str::to_string),
    }
}

fn engine() -> AggregationEngine {
    AggregationEngine::new(&MonitorConfig::default())
}

#[test]
fn default_config_matches_documented_values() {
    let config = MonitorConfig::default();
    assert_eq!(config.period_secs, 1800);
    assert_eq!(config.alert_threshold, 100);
    assert_eq!(config.staleness_secs, 7200);
    assert_eq!(config.retry_delay_ms, 1000);
    assert_eq!(config.rotation_pause_ms, 2000);
}

#[test]
fn partial_config_fills_defaults() {
    let config: MonitorConfig = toml::from_str("alert_threshold = 5").unwrap();
    assert_eq!(config.alert_threshold, 5);
    assert_eq!(config.period_secs, 1800);
}

#[test]
fn single_exception_alerts_once_past_threshold() {
    let mut engine = engine();
    let now = t0() + Duration::seconds(30);
    let mut alerts = Vec::new();

    for i in 0..101 {
        let outcome = engine.ingest(&make_record("Api", "NullPointer", None, i / 10), now);
        alerts.extend(outcome.into_reports());
        if i < 100 {
            assert!(alerts.is_empty(), "alerted early at record {i}");
        }
    }

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.kind, ReportKind::Violation);
    assert_eq!(alert.interval, ReportInterval::Realtime);
    assert_eq!(alert.window_start, t0());
    assert_eq!(alert.tree.exception_count("Api", "NullPointer", "NA"), Some(101));
    assert_eq!(alert.tree.leaf_count(), 1);
}

#[test]
fn alert_fires_once_per_window_and_again_after_rotation() {
    let mut engine = engine();
    let mut violations = 0;

    for i in 0..250 {
        let outcome = engine.ingest(&make_record("Api", "Down", Some("Timeout"), i), t0() + Duration::seconds(i));
        violations += outcome
            .reports()
            .iter()
            .filter(|r| r.kind == ReportKind::Violation)
            .count();
    }
    assert_eq!(violations, 1);
    assert!(engine.window().alerted().contains("Timeout"));

    // Next window starts at 1801s; gate stays open because `now` tracks the feed.
    let base = 1801;
    let mut kinds = Vec::new();
    for i in 0..101 {
        let ts = base + i;
        let outcome = engine.ingest(&make_record("Api", "Down", Some("Timeout"), ts), t0() + Duration::seconds(ts));
        kinds.extend(outcome.reports().iter().map(|r| r.kind));
    }
    assert_eq!(kinds, vec![ReportKind::Summary, ReportKind::Violation]);
}

#[test]
fn dedup_is_keyed_on_exception_only() {
    let mut tree = CountTree::new();
    for _ in 0..101 {
        tree.update("A", "d1", "Timeout");
        tree.update("B", "d2", "Timeout");
    }
    let detector = ViolationDetector::new(100);
    let mut alerted = AlertedSet::new();

    let violations = detector.check(&tree, &mut alerted);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].title, "A");
    assert!(detector.check(&tree, &mut alerted).is_empty());
}

#[test]
fn detector_ignores_counts_at_threshold() {
    let mut tree = CountTree::new();
    for _ in 0..100 {
        tree.update("A", "d1", "NA");
    }
    let mut alerted = AlertedSet::new();
    assert!(ViolationDetector::new(100).check(&tree, &mut alerted).is_empty());
    assert!(alerted.is_empty());
}

#[test]
fn window_rotation_emits_summary_of_prior_records() {
    let mut engine = engine();
    let now = t0() + Duration::minutes(31);
    let inputs = [
        ("A", "d1", 0),
        ("A", "d2", 10),
        ("B", "d3", 20),
        ("B", "d4", 30),
        ("B", "d5", 40),
    ];
    for (title, desc, secs) in inputs {
        let outcome = engine.ingest(&make_record(title, desc, None, secs), now);
        assert!(!outcome.rotated());
        assert!(outcome.reports().is_empty());
    }
    assert_eq!(engine.window().tree().total(), 5);

    let outcome = engine.ingest(&make_record("C", "d6", None, 1801), now);
    assert!(outcome.rotated());
    let reports = outcome.into_reports();
    assert_eq!(reports.len(), 1);

    let summary = &reports[0];
    assert_eq!(summary.kind, ReportKind::Summary);
    assert_eq!(summary.window_start, t0());
    assert_eq!(summary.interval, ReportInterval::Every { minutes: 30 });
    assert_eq!(summary.tree.total(), 5);
    assert_eq!(summary.tree.title("A").unwrap().count(), 2);
    assert_eq!(summary.tree.title("B").unwrap().count(), 3);
    assert!(summary.tree.title("C").is_none());

    let window = engine.window();
    assert_eq!(window.start(), Some(t0() + Duration::seconds(1801)));
    assert!(window.alerted().is_empty());
    assert_eq!(window.tree().total(), 1);
    assert!(window.tree().title("C").is_some());
}

#[test]
fn rotation_clears_alerted_set() {
    let mut engine = engine();
    let now = t0() + Duration::minutes(31);
    for i in 0..101 {
        engine.ingest(&make_record("A", "d", Some("Boom"), i), now);
    }
    assert_eq!(engine.window().alerted().len(), 1);

    engine.ingest(&make_record("A", "d", Some("Other"), 1801), now);
    assert!(engine.window().alerted().is_empty());
}

#[test]
fn skipped_record_changes_nothing() {
    let mut engine = engine();
    let now = t0();
    engine.ingest(&make_record("A", "d", None, 0), now);
    let before = engine.window().tree().snapshot();

    let mut legacy = make_record("A", "d", None, 5000);
    legacy.description = None;
    let outcome = engine.ingest(&legacy, now);

    assert!(outcome.is_skipped());
    assert_eq!(engine.window().tree(), &before);
    assert_eq!(engine.window().start(), Some(t0()));
}

#[test]
fn skipped_first_record_does_not_anchor_window() {
    let mut engine = engine();
    let mut legacy = make_record("A", "d", None, 0);
    legacy.description = None;
    assert!(matches!(engine.ingest(&legacy, t0()), Ingest::Skipped));
    assert!(engine.window().start().is_none());
}

#[test]
fn gate_suppresses_violation_from_previous_day() {
    let mut engine = engine();
    let yesterday = Utc.with_ymd_and_hms(2026, 10, 13, 23, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 0, 10, 0).unwrap();

    let mut emitted = 0;
    for i in 0..101 {
        let mut record = make_record("A", "d", None, 0);
        record.timestamp = Some(yesterday + Duration::seconds(i));
        emitted += engine.ingest(&record, now).reports().len();
    }

    assert_eq!(emitted, 0);
    // Still marked, so the same window never retries the alert.
    assert!(engine.window().alerted().contains("NA"));
}

#[test]
fn gate_suppresses_stale_summary_but_window_still_resets() {
    let mut engine = engine();
    let now = t0() + Duration::hours(3);
    engine.ingest(&make_record("A", "d", None, 0), now);

    let outcome = engine.ingest(&make_record("A", "d", None, 1801), now);
    assert!(outcome.rotated());
    assert!(outcome.reports().is_empty());
    assert_eq!(engine.window().tree().total(), 1);
    assert_eq!(engine.window().start(), Some(t0() + Duration::seconds(1801)));
}

#[test]
fn tree_invariant_holds_through_engine_updates() {
    let mut engine = engine();
    let titles = ["A", "B"];
    let exceptions = [None, Some("IOError"), Some("KeyError")];
    for i in 0..90usize {
        let record = make_record(titles[i % 2], "d", exceptions[i % 3], i as i64);
        engine.ingest(&record, t0());
        assert!(engine.window().tree().is_consistent());
    }
    assert_eq!(engine.window().tree().total(), 90);
    assert_eq!(engine.window().tree().exception_count("A", "d", "NA"), Some(15));
}
