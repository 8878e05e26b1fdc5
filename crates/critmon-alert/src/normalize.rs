use critmon_common::record::{NormalizedRecord, RawRecord, NO_EXCEPTION};

/// Characters stripped from every key before it reaches a report.
const DISALLOWED: [char; 3] = ['\'', '<', '>'];

/// Turns a raw record into aggregation keys.
///
/// Returns `None` for records without a description or timestamp; those
/// come from producers older than the current schema and are ignored. A
/// missing title collapses to the empty string.
pub fn normalize(raw: &RawRecord) -> Option<NormalizedRecord> {
    let description = raw.description.as_deref()?;
    let timestamp = raw.timestamp?;

    Some(NormalizedRecord {
        timestamp,
        title: sanitize(raw.title.as_deref().unwrap_or_default()),
        description: sanitize(description),
        exception: raw
            .exception
            .as_deref()
            .map(sanitize)
            .unwrap_or_else(|| NO_EXCEPTION.to_string()),
    })
}

pub fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !DISALLOWED.contains(c)).collect()
}
