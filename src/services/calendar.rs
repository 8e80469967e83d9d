//! Business-day calendar
//!
//! A day is a holiday when it is a Sunday, a published public holiday, or a
//! company closure day. Everything else is a business day.

use crate::types::{BusinessWindow, YearMonth};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// Published public holidays (2026)
const PUBLIC_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2026, 1, 1),
    (2026, 1, 12),
    (2026, 2, 11),
    (2026, 3, 20),
    (2026, 4, 29),
    (2026, 5, 3),
    (2026, 5, 4),
    (2026, 5, 5),
    (2026, 5, 6),
    (2026, 7, 23),
    (2026, 8, 10),
    (2026, 9, 21),
    (2026, 9, 22),
    (2026, 9, 23),
    (2026, 10, 12),
    (2026, 11, 3),
    (2026, 11, 23),
];

/// Company new-year closure (2026)
const COMPANY_CLOSURES: &[(i32, u32, u32)] = &[
    (2026, 1, 1),
    (2026, 1, 2),
    (2026, 1, 3),
    (2026, 1, 4),
];

fn to_dates(list: &[(i32, u32, u32)]) -> HashSet<NaiveDate> {
    list.iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
    closures: HashSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self {
            holidays: to_dates(PUBLIC_HOLIDAYS),
            closures: to_dates(COMPANY_CLOSURES),
        }
    }
}

impl HolidayCalendar {
    /// Built-in lists plus extra dates from configuration
    pub fn with_extra(holidays: &[NaiveDate], closures: &[NaiveDate]) -> Self {
        let mut calendar = Self::default();
        calendar.holidays.extend(holidays.iter().copied());
        calendar.closures.extend(closures.iter().copied());
        calendar
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sun
            || self.holidays.contains(&date)
            || self.closures.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.is_holiday(date)
    }

    /// Averaging window for `month` as seen on `today`.
    ///
    /// The month in progress counts business days strictly before today;
    /// any other month counts all of its business days.
    pub fn business_window(&self, month: YearMonth, today: NaiveDate) -> BusinessWindow {
        let in_progress = YearMonth::of(today) == month;
        let cutoff_day = if in_progress {
            today.day().saturating_sub(1)
        } else {
            month.days_in_month()
        };

        let active_days: Vec<u32> = (1..=cutoff_day)
            .filter(|&d| month.day(d).is_some_and(|date| self.is_business_day(date)))
            .collect();
        let denominator = (active_days.len() as u32).max(1);

        BusinessWindow {
            cutoff_day,
            active_days,
            denominator,
            in_progress,
        }
    }
}
