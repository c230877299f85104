//! # Time-Bucket Aggregator
//! Hour-of-day / day-of-week histograms plus two categorical tallies.
//!
//! Timestamps are bucketed by the wall-clock time written in the record;
//! offsets in RFC 3339 values are kept, not converted. Rows whose timestamp
//! does not parse are skipped for the histograms (and counted in `skipped`)
//! but still feed both tallies.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashMap;

use crate::record::Record;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBuckets {
    pub by_type: HashMap<String, usize>,
    pub by_severity: HashMap<String, usize>,
    pub by_hour: [usize; 24],
    /// Sunday = 0.
    pub by_day: [usize; 7],
    pub skipped: usize,
}

impl TimeBuckets {
    /// Rows that made it into the histograms.
    pub fn bucketed(&self) -> usize {
        self.by_hour.iter().sum()
    }
}

/// Parse a timestamp in one of the supported export formats.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Bucket `records` by `timestamp_field` and tally `type_field` / `severity_field`.
pub fn bucket(
    records: &[Record],
    timestamp_field: &str,
    type_field: &str,
    severity_field: &str,
) -> TimeBuckets {
    let mut out = TimeBuckets {
        by_type: HashMap::new(),
        by_severity: HashMap::new(),
        by_hour: [0; 24],
        by_day: [0; 7],
        skipped: 0,
    };

    for r in records {
        *out.by_type.entry(r.key(type_field).to_string()).or_default() += 1;
        *out
            .by_severity
            .entry(r.key(severity_field).to_string())
            .or_default() += 1;

        match r.get(timestamp_field).and_then(parse_timestamp) {
            Some(ts) => {
                out.by_hour[ts.hour() as usize] += 1;
                out.by_day[ts.weekday().num_days_from_sunday() as usize] += 1;
            }
            None => out.skipped += 1,
        }
    }

    out
}

/// Attack pattern view over the security incident log.
pub fn attack_patterns(incidents: &[Record]) -> TimeBuckets {
    bucket(incidents, "Timestamp", "Attack Type", "Severity Level")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inc(ts: &str, attack: &str, sev: &str) -> Record {
        Record::from_pairs([
            ("Timestamp", ts),
            ("Attack Type", attack),
            ("Severity Level", sev),
        ])
    }

    #[test]
    fn parses_supported_formats() {
        let cases = [
            ("2023-05-30 06:33:58", 6),
            ("2023-05-30T14:05", 14),
            ("2023-05-30T23:59:59Z", 23),
            ("2023-05-30T08:00:00+02:00", 8),
            ("05/30/2023 17:45", 17),
            ("2023-05-30", 0),
        ];
        for (raw, hour) in cases {
            let ts = parse_timestamp(raw).unwrap_or_else(|| panic!("should parse {raw}"));
            assert_eq!(ts.hour(), hour, "{raw}");
        }
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn histograms_skip_unparsable_but_tallies_do_not() {
        let rows = vec![
            // 2023-05-28 was a Sunday
            inc("2023-05-28 10:15:00", "DDoS", "High"),
            inc("2023-05-29 10:45:00", "Malware", "Critical"),
            inc("not a time", "DDoS", "Low"),
            inc("2023-06-03 23:00:00", "Intrusion", "High"),
        ];
        let p = attack_patterns(&rows);

        assert_eq!(p.skipped, 1);
        assert_eq!(p.bucketed(), 3);
        assert!(p.bucketed() < rows.len());
        assert_eq!(p.by_day.iter().sum::<usize>(), 3);
        assert_eq!(p.by_hour[10], 2);
        assert_eq!(p.by_hour[23], 1);
        assert_eq!(p.by_day[0], 1); // Sunday
        assert_eq!(p.by_day[1], 1); // Monday
        assert_eq!(p.by_day[6], 1); // Saturday

        assert_eq!(p.by_type.values().sum::<usize>(), rows.len());
        assert_eq!(p.by_type["DDoS"], 2);
        assert_eq!(p.by_severity["High"], 2);
    }

    #[test]
    fn empty_log_has_zeroed_buckets() {
        let p = attack_patterns(&[]);
        assert_eq!(p.by_hour, [0; 24]);
        assert_eq!(p.by_day, [0; 7]);
        assert!(p.by_type.is_empty());

        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["byHour"].as_array().map(Vec::len), Some(24));
        assert_eq!(v["byDay"].as_array().map(Vec::len), Some(7));
    }
}
