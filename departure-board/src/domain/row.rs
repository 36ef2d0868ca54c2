//! Formatted board rows.

use chrono::{NaiveDateTime, TimeDelta};

/// Most rows shown per route.
pub const MAX_ROWS: usize = 3;

/// At or below this many seconds a service shows as "Due".
pub const DUE_THRESHOLD_SECS: i64 = 30;

/// Text shown in the eta and time columns of an empty or failed slot.
pub const PLACEHOLDER: &str = "—";

/// Destination text of an empty slot.
pub const NO_FURTHER_SERVICES: &str = "No further services";

/// One visible row: countdown, clock time and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub eta: String,
    pub scheduled_time: String,
    pub destination: String,
}

impl DisplayRow {
    /// Format a service arriving in `secs` seconds, relative to `now`.
    pub fn new(secs: i64, destination: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            eta: format_eta(secs),
            scheduled_time: format_scheduled(now, secs),
            destination: destination.into(),
        }
    }

    /// The filler row for a slot with no service.
    pub fn empty() -> Self {
        Self {
            eta: PLACEHOLDER.to_string(),
            scheduled_time: PLACEHOLDER.to_string(),
            destination: NO_FURTHER_SERVICES.to_string(),
        }
    }

    /// The synthetic row shown when a fetch fails.
    pub fn error(cause: impl std::fmt::Display) -> Self {
        Self {
            eta: PLACEHOLDER.to_string(),
            scheduled_time: PLACEHOLDER.to_string(),
            destination: format!("Error fetching data: {cause}"),
        }
    }
}

/// "Due" within the threshold, otherwise whole minutes rounded down.
///
/// # Examples
///
/// ```
/// use departure_board::domain::format_eta;
///
/// assert_eq!(format_eta(30), "Due");
/// assert_eq!(format_eta(45), "0 min");
/// assert_eq!(format_eta(125), "2 min");
/// ```
pub fn format_eta(secs: i64) -> String {
    if secs <= DUE_THRESHOLD_SECS {
        "Due".to_string()
    } else {
        format!("{} min", secs / 60)
    }
}

/// Wall-clock "HH:MM" at `now + secs`.
pub fn format_scheduled(now: NaiveDateTime, secs: i64) -> String {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(23, 58, 40)
            .unwrap()
    }

    #[test]
    fn eta_boundaries() {
        assert_eq!(format_eta(0), "Due");
        assert_eq!(format_eta(30), "Due");
        assert_eq!(format_eta(31), "0 min");
        assert_eq!(format_eta(45), "0 min");
        assert_eq!(format_eta(60), "1 min");
        assert_eq!(format_eta(119), "1 min");
        assert_eq!(format_eta(600), "10 min");
    }

    #[test]
    fn scheduled_time_crosses_midnight() {
        assert_eq!(format_scheduled(now(), 0), "23:58");
        assert_eq!(format_scheduled(now(), 45), "23:59");
        assert_eq!(format_scheduled(now(), 90), "00:00");
    }

    #[test]
    fn scheduled_time_out_of_range() {
        assert_eq!(format_scheduled(now(), i64::MAX), "--:--");
    }

    #[test]
    fn row_for_45_seconds() {
        let row = DisplayRow::new(45, "Morden", now());
        assert_eq!(row.eta, "0 min");
        assert_eq!(row.scheduled_time, "23:59");
        assert_eq!(row.destination, "Morden");
    }

    #[test]
    fn placeholder_rows() {
        let empty = DisplayRow::empty();
        assert_eq!(empty.eta, PLACEHOLDER);
        assert_eq!(empty.scheduled_time, PLACEHOLDER);
        assert_eq!(empty.destination, NO_FURTHER_SERVICES);

        let error = DisplayRow::error("HTTP 503: down");
        assert_eq!(error.eta, PLACEHOLDER);
        assert_eq!(error.destination, "Error fetching data: HTTP 503: down");
    }

    proptest! {
        /// Anything within the threshold is due
        #[test]
        fn due_at_or_below_threshold(secs in -3600i64..=DUE_THRESHOLD_SECS) {
            prop_assert_eq!(format_eta(secs), "Due");
        }

        /// Above the threshold the minute count is floor(secs / 60)
        #[test]
        fn minutes_round_down(secs in (DUE_THRESHOLD_SECS + 1)..86_400i64) {
            prop_assert_eq!(format_eta(secs), format!("{} min", secs / 60));
        }

        /// Scheduled time is always HH:MM
        #[test]
        fn scheduled_is_hh_mm(secs in 0i64..200_000) {
            let s = format_scheduled(now(), secs);
            prop_assert_eq!(s.len(), 5);
            prop_assert_eq!(&s[2..3], ":");
        }
    }
}
