//! Billing period boundary shared by every unit in a recompute pass.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveTime, Utc};
use serde::Serialize;

use crate::model::EnergyReading;

/// Calendar month over which emissions are aggregated.
///
/// Membership is open-ended: a reading belongs to the period when its
/// timestamp is at or after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPeriod {
    /// First instant of the month (UTC).
    pub start: DateTime<Utc>,
}

impl BillingPeriod {
    /// Period whose month contains `ts`.
    pub fn containing(ts: DateTime<Utc>) -> Self {
        let date = ts.date_naive();
        let first = date.with_day(1).unwrap_or(date);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Active period for a reading set: the month of the latest reading,
    /// or the month of `now` when there are none.
    pub fn active(readings: &[EnergyReading], now: DateTime<Utc>) -> Self {
        let latest = readings.iter().map(|r| r.timestamp()).max();
        Self::containing(latest.unwrap_or(now))
    }

    /// Returns `true` if `ts` falls in the period.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start
    }

    /// First instant of the following month.
    pub fn next_start(&self) -> DateTime<Utc> {
        self.start
            .checked_add_months(Months::new(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Number of calendar days in the period's month.
    pub fn days(&self) -> u32 {
        (self.next_start() - self.start).num_days() as u32
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.start.year(), self.start.month())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn containing_truncates_to_first_of_month() {
        let p = BillingPeriod::containing(ts(2025, 3, 17, 14));
        assert_eq!(p.start, ts(2025, 3, 1, 0));
        assert_eq!(p.to_string(), "2025-03");
    }

    #[test]
    fn active_uses_latest_reading_globally() {
        let readings = vec![
            EnergyReading::new("a", ts(2025, 1, 30, 0), 1.0, 0.4),
            EnergyReading::new("b", ts(2025, 2, 2, 0), 1.0, 0.4),
            EnergyReading::new("a", ts(2025, 1, 5, 0), 1.0, 0.4),
        ];
        let p = BillingPeriod::active(&readings, ts(2030, 6, 1, 0));
        assert_eq!(p.start, ts(2025, 2, 1, 0));
    }

    #[test]
    fn active_falls_back_to_now() {
        let p = BillingPeriod::active(&[], ts(2026, 10, 18, 9));
        assert_eq!(p.start, ts(2026, 10, 1, 0));
    }

    #[test]
    fn contains_is_inclusive_of_start() {
        let p = BillingPeriod::containing(ts(2025, 2, 10, 0));
        assert!(p.contains(ts(2025, 2, 1, 0)));
        assert!(p.contains(ts(2025, 3, 4, 0)));
        assert!(!p.contains(ts(2025, 1, 31, 23)));
    }

    #[test]
    fn days_in_month() {
        assert_eq!(BillingPeriod::containing(ts(2024, 2, 3, 0)).days(), 29);
        assert_eq!(BillingPeriod::containing(ts(2025, 2, 3, 0)).days(), 28);
        assert_eq!(BillingPeriod::containing(ts(2025, 12, 3, 0)).days(), 31);
    }
}
