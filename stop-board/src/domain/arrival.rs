//! Arrival predictions and wait-time processing.
//!
//! Raw predictions arrive with an RFC 3339 `eta` that may be null (the
//! directory sends null once a route has stopped running for the day).
//! [`process`] turns a batch of them into a list ordered by how long the
//! rider has to wait.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::warn;

/// One predicted vehicle arrival at a stop. Read-only input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRecord {
    /// Route number, e.g. "1A".
    pub route: String,

    /// Primary (Traditional Chinese) destination name.
    pub destination_primary: String,

    /// Secondary (English) destination name.
    pub destination_secondary: String,

    /// Estimated arrival time, unparsed.
    pub eta: Option<String>,

    /// Free-text remark from the operator, if any.
    pub remark: Option<String>,
}

/// An arrival annotated with whole minutes until it reaches the stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedArrival {
    #[serde(flatten)]
    pub record: ArrivalRecord,

    /// Parsed arrival time, in the offset the directory reported.
    pub arrives_at: DateTime<FixedOffset>,

    /// Minutes until arrival, never negative.
    pub wait_minutes: u32,
}

impl ProcessedArrival {
    /// Clock time of arrival as "HH:MM" in the reported offset.
    pub fn clock_time(&self) -> String {
        self.arrives_at.format("%H:%M").to_string()
    }
}

/// Minutes between `now` and `eta`, rounded half-up and clamped at zero.
pub fn wait_minutes(eta: DateTime<FixedOffset>, now: DateTime<Utc>) -> u32 {
    let millis = eta.signed_duration_since(now).num_milliseconds();
    let minutes = millis.saturating_add(30_000).div_euclid(60_000);
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Annotate arrivals with wait times and sort them soonest first.
///
/// Records whose `eta` is missing or not a valid RFC 3339 timestamp are
/// dropped with a warning. The sort is stable, so arrivals with the same
/// wait keep their input order. The input is not modified.
pub fn process(arrivals: &[ArrivalRecord], now: DateTime<Utc>) -> Vec<ProcessedArrival> {
    let mut processed: Vec<ProcessedArrival> = arrivals
        .iter()
        .filter_map(|record| {
            let Some(raw) = record.eta.as_deref() else {
                warn!(route = %record.route, "skipping arrival with no ETA");
                return None;
            };

            match DateTime::parse_from_rfc3339(raw) {
                Ok(arrives_at) => Some(ProcessedArrival {
                    record: record.clone(),
                    arrives_at,
                    wait_minutes: wait_minutes(arrives_at, now),
                }),
                Err(e) => {
                    warn!(route = %record.route, eta = raw, error = %e, "skipping arrival with unparseable ETA");
                    None
                }
            }
        })
        .collect();

    processed.sort_by_key(|a| a.wait_minutes);
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // 2024-03-15 12:00:00 +08:00
        Utc.with_ymd_and_hms(2024, 3, 15, 4, 0, 0).unwrap()
    }

    fn record(route: &str, eta: Option<&str>) -> ArrivalRecord {
        ArrivalRecord {
            route: route.to_string(),
            destination_primary: "尖沙咀".to_string(),
            destination_secondary: "TSIM SHA TSUI".to_string(),
            eta: eta.map(str::to_string),
            remark: None,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(process(&[], now()).is_empty());
    }

    #[test]
    fn computes_wait_minutes() {
        let arrivals = vec![record("1A", Some("2024-03-15T12:07:00+08:00"))];
        let out = process(&arrivals, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].wait_minutes, 7);
        assert_eq!(out[0].clock_time(), "12:07");
    }

    #[test]
    fn rounds_half_up() {
        let arrivals = vec![
            record("a", Some("2024-03-15T12:02:29+08:00")),
            record("b", Some("2024-03-15T12:02:30+08:00")),
        ];
        let out = process(&arrivals, now());
        assert_eq!(out[0].wait_minutes, 2);
        assert_eq!(out[1].wait_minutes, 3);
    }

    #[test]
    fn past_arrivals_clamp_to_zero() {
        let arrivals = vec![record("1A", Some("2024-03-15T11:00:00+08:00"))];
        let out = process(&arrivals, now());
        assert_eq!(out[0].wait_minutes, 0);
    }

    #[test]
    fn sorts_soonest_first() {
        let arrivals = vec![
            record("5", Some("2024-03-15T12:20:00+08:00")),
            record("1A", Some("2024-03-15T12:03:00+08:00")),
            record("2", Some("2024-03-15T12:10:00+08:00")),
        ];
        let routes: Vec<_> = process(&arrivals, now())
            .into_iter()
            .map(|a| a.record.route)
            .collect();
        assert_eq!(routes, vec!["1A", "2", "5"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let arrivals = vec![
            record("first", Some("2024-03-15T12:05:00+08:00")),
            record("second", Some("2024-03-15T12:05:10+08:00")),
            record("earlier", Some("2024-03-15T12:01:00+08:00")),
            record("third", Some("2024-03-15T12:04:50+08:00")),
        ];
        let routes: Vec<_> = process(&arrivals, now())
            .into_iter()
            .map(|a| a.record.route)
            .collect();
        assert_eq!(routes, vec!["earlier", "first", "second", "third"]);
    }

    #[test]
    fn skips_missing_and_invalid_eta() {
        let arrivals = vec![
            record("ok", Some("2024-03-15T12:05:00+08:00")),
            record("null", None),
            record("garbage", Some("not a time")),
            record("empty", Some("")),
        ];
        let out = process(&arrivals, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.route, "ok");
    }

    #[test]
    fn input_is_not_modified() {
        let arrivals = vec![
            record("b", Some("2024-03-15T12:10:00+08:00")),
            record("a", Some("2024-03-15T12:01:00+08:00")),
        ];
        let before = arrivals.clone();
        let _ = process(&arrivals, now());
        assert_eq!(arrivals, before);
    }

    #[test]
    fn offsets_are_respected() {
        // Same instant expressed in UTC
        let arrivals = vec![record("1A", Some("2024-03-15T04:15:00Z"))];
        let out = process(&arrivals, now());
        assert_eq!(out[0].wait_minutes, 15);
        assert_eq!(out[0].clock_time(), "04:15");
    }
}
