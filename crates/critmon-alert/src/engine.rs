use crate::config::MonitorConfig;
use crate::detector::ViolationDetector;
use crate::gate::ReportGate;
use crate::normalize::normalize;
use crate::window::{WindowController, WindowState};
use chrono::{DateTime, Utc};
use critmon_common::record::RawRecord;
use critmon_common::report::Report;

/// Result of feeding one record to the engine.
#[derive(Debug)]
pub enum Ingest {
    /// The record failed normalization; no state changed.
    Skipped,
    Applied {
        /// Reports that passed the gate, in emission order.
        reports: Vec<Report>,
        /// Whether this record closed the previous window.
        rotated: bool,
    },
}

impl Ingest {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Ingest::Skipped)
    }

    pub fn rotated(&self) -> bool {
        matches!(self, Ingest::Applied { rotated: true, .. })
    }

    pub fn reports(&self) -> &[Report] {
        match self {
            Ingest::Skipped => &[],
            Ingest::Applied { reports, .. } => reports,
        }
    }

    pub fn into_reports(self) -> Vec<Report> {
        match self {
            Ingest::Skipped => Vec::new(),
            Ingest::Applied { reports, .. } => reports,
        }
    }
}

/// Single-owner aggregation state machine.
///
/// Each call to [`ingest`](Self::ingest) normalizes the record, closes the
/// window if the record lies past the period, counts the record, and scans
/// for new violations. `now` is the wall-clock time used by the gate.
///
/// The record that closes a window is not part of its summary: it anchors
/// the next window and is counted there.
pub struct AggregationEngine {
    period_secs: u64,
    window: WindowController,
    detector: ViolationDetector,
    gate: ReportGate,
}

impl AggregationEngine {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            period_secs: config.period_secs,
            window: WindowController::new(config.period()),
            detector: ViolationDetector::new(config.alert_threshold),
            gate: ReportGate::new(config.staleness()),
        }
    }

    pub fn window(&self) -> &WindowState {
        self.window.state()
    }

    pub fn ingest(&mut self, raw: &RawRecord, now: DateTime<Utc>) -> Ingest {
        let Some(record) = normalize(raw) else {
            tracing::debug!(
                has_timestamp = raw.timestamp.is_some(),
                has_description = raw.description.is_some(),
                "Skipping record not in current format"
            );
            return Ingest::Skipped;
        };

        let mut reports = Vec::new();
        let mut rotated = false;

        let start = self.window.anchor(record.timestamp);
        if self.window.is_elapsed(record.timestamp) {
            let closed = self.window.rotate(record.timestamp);
            let records = closed.tree().total();
            tracing::info!(
                window_start = %start,
                next_start = %record.timestamp,
                records,
                "Window elapsed, rotating"
            );
            let summary = Report::summary(start, self.period_secs, closed.into_tree());
            self.gate_into(summary, now, &mut reports);
            rotated = true;
        }

        let start = self.window.anchor(record.timestamp);
        let (tree, alerted) = self.window.state_mut().parts_mut();
        tree.update(&record.title, &record.description, &record.exception);

        for violation in self.detector.check(tree, alerted) {
            tracing::warn!(
                title = %violation.title,
                description = %violation.description,
                exception = %violation.exception,
                count = violation.count,
                threshold = self.detector.threshold(),
                "Exception crossed alert threshold"
            );
            let alert = Report::violation(start, violation.to_tree());
            self.gate_into(alert, now, &mut reports);
        }

        Ingest::Applied { reports, rotated }
    }

    fn gate_into(&self, report: Report, now: DateTime<Utc>, out: &mut Vec<Report>) {
        let verdict = self.gate.check(report.window_start, now);
        if verdict.is_allowed() {
            out.push(report);
        } else {
            tracing::info!(
                kind = %report.kind,
                window_start = %report.window_start,
                reason = %verdict,
                "Report suppressed by gate"
            );
        }
    }
}
