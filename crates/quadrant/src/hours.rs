//! Weekly opening hours.
//!
//! A [`WeeklyHours`] maps each weekday to zero or more [`HoursInterval`]s.
//! An interval whose close time is not after its open time runs past
//! midnight into the following day; `22:00-02:00` on Friday covers Friday
//! night and the first two hours of Saturday.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

/// One opening interval within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursInterval {
    /// Opening time.
    pub open: NaiveTime,
    /// Closing time. Not after `open` means the interval ends the next day.
    pub close: NaiveTime,
}

impl HoursInterval {
    /// Create an interval.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// Create an interval from hour/minute pairs.
    ///
    /// Returns `None` if either time is invalid.
    pub fn from_hm(open: (u32, u32), close: (u32, u32)) -> Option<Self> {
        Some(Self {
            open: NaiveTime::from_hms_opt(open.0, open.1, 0)?,
            close: NaiveTime::from_hms_opt(close.0, close.1, 0)?,
        })
    }

    /// Whether the interval continues past midnight.
    #[inline]
    pub fn spans_midnight(&self) -> bool {
        self.close <= self.open
    }

    /// Whether `time` falls in the part of the interval on its own day.
    fn covers_same_day(&self, time: NaiveTime) -> bool {
        if self.spans_midnight() {
            time >= self.open
        } else {
            time >= self.open && time < self.close
        }
    }

    /// Whether `time` falls in the part that spilled into the next day.
    fn covers_next_day(&self, time: NaiveTime) -> bool {
        self.spans_midnight() && time < self.close
    }
}

/// Opening hours for every day of the week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyHours {
    days: [Vec<HoursInterval>; 7],
}

impl WeeklyHours {
    /// Hours with every day closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interval to `day`.
    pub fn with_interval(mut self, day: Weekday, interval: HoursInterval) -> Self {
        self.add_interval(day, interval);
        self
    }

    /// Add the same interval to every day of the week.
    pub fn every_day(interval: HoursInterval) -> Self {
        let mut hours = Self::new();
        for day in &mut hours.days {
            day.push(interval);
        }
        hours
    }

    /// Add an interval to `day`.
    pub fn add_interval(&mut self, day: Weekday, interval: HoursInterval) {
        self.days[day.num_days_from_monday() as usize].push(interval);
    }

    /// The intervals for `day`.
    pub fn intervals(&self, day: Weekday) -> &[HoursInterval] {
        &self.days[day.num_days_from_monday() as usize]
    }

    /// Whether the hours have no intervals at all.
    pub fn is_always_closed(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Whether the place is open at `at`.
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let day = at.weekday();
        let time = at.time();

        self.intervals(day).iter().any(|i| i.covers_same_day(time))
            || self.intervals(day.pred()).iter().any(|i| i.covers_next_day(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // 2024-01-01 is a Monday.
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_simple_interval() {
        let hours = WeeklyHours::new()
            .with_interval(Weekday::Mon, HoursInterval::from_hm((9, 0), (17, 0)).unwrap());

        assert!(!hours.is_open_at(at(1, 8, 59)));
        assert!(hours.is_open_at(at(1, 9, 0)));
        assert!(hours.is_open_at(at(1, 16, 59)));
        assert!(!hours.is_open_at(at(1, 17, 0)));
        // Tuesday has no hours.
        assert!(!hours.is_open_at(at(2, 12, 0)));
    }

    #[test]
    fn test_interval_past_midnight() {
        let hours = WeeklyHours::new()
            .with_interval(Weekday::Fri, HoursInterval::from_hm((22, 0), (2, 0)).unwrap());

        // 2024-01-05 is a Friday.
        assert!(hours.is_open_at(at(5, 23, 30)));
        assert!(hours.is_open_at(at(6, 1, 59)));
        assert!(!hours.is_open_at(at(6, 2, 0)));
        assert!(!hours.is_open_at(at(5, 1, 0)));
    }

    #[test]
    fn test_sunday_night_wraps_to_monday() {
        let hours = WeeklyHours::new()
            .with_interval(Weekday::Sun, HoursInterval::from_hm((20, 0), (1, 0)).unwrap());
        assert!(hours.is_open_at(at(1, 0, 30)));
    }

    #[test]
    fn test_every_day_and_closed() {
        let open = WeeklyHours::every_day(HoursInterval::from_hm((8, 0), (20, 0)).unwrap());
        for day in 1..=7 {
            assert!(open.is_open_at(at(day, 12, 0)));
        }
        assert!(!open.is_always_closed());
        assert!(WeeklyHours::new().is_always_closed());
    }

    #[test]
    fn test_invalid_time_rejected() {
        assert!(HoursInterval::from_hm((25, 0), (2, 0)).is_none());
    }
}
