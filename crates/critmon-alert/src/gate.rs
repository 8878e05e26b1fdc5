use chrono::{DateTime, Duration, Utc};

/// Outcome of a gate check, kept distinct so callers can log the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Allowed,
    /// Window started on a different calendar day than today.
    DifferentDay,
    /// Window started longer ago than the staleness bound.
    Stale,
}

impl GateVerdict {
    pub fn is_allowed(self) -> bool {
        self == GateVerdict::Allowed
    }
}

impl std::fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateVerdict::Allowed => write!(f, "allowed"),
            GateVerdict::DifferentDay => write!(f, "different_day"),
            GateVerdict::Stale => write!(f, "stale"),
        }
    }
}

/// Suppresses reports for backlog data so replaying history after a cold
/// start does not flood the sink.
///
/// Compares the window start (record clock) with `now` (wall clock).
/// Calendar days are UTC days.
pub struct ReportGate {
    staleness: Duration,
}

impl ReportGate {
    pub fn new(staleness: Duration) -> Self {
        Self { staleness }
    }

    pub fn check(&self, window_start: DateTime<Utc>, now: DateTime<Utc>) -> GateVerdict {
        if window_start.date_naive() != now.date_naive() {
            return GateVerdict::DifferentDay;
        }
        if now - window_start > self.staleness {
            return GateVerdict::Stale;
        }
        GateVerdict::Allowed
    }

    pub fn allowed(&self, window_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.check(window_start, now).is_allowed()
    }
}
