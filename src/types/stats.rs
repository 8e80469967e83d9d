//! Derived statistics types (monthly matrix, dashboard)

use super::Department;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A calendar month, parsed from `YYYY-MM` (or `YYYY/MM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("invalid month '{}', expected YYYY-MM", s);
        let (y, m) = s.trim().split_once(['-', '/']).ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// Which days of a month count toward business-day averages.
///
/// For the month in progress only days before today count, since same-day
/// data is not fully entered yet. Other months count the whole month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessWindow {
    /// Last day of the month included in averaging (0 when none)
    pub cutoff_day: u32,
    /// Business days in `1..=cutoff_day`
    pub active_days: Vec<u32>,
    /// `max(1, active_days.len())`
    pub denominator: u32,
    pub in_progress: bool,
}

impl BusinessWindow {
    pub fn is_active(&self, day: u32) -> bool {
        self.active_days.binary_search(&day).is_ok()
    }
}

/// One line of the monthly matrix (an item, or a department total)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub label: String,
    /// Count per day of month; index 0 is day 1
    pub daily: Vec<u64>,
    pub monthly_total: u64,
    /// Sum over the window's active days
    pub business_total: u64,
    pub average: f64,
}

impl MatrixRow {
    pub fn value(&self, day: u32) -> u64 {
        day.checked_sub(1)
            .and_then(|i| self.daily.get(i as usize))
            .copied()
            .unwrap_or(0)
    }
}

/// Item rows and the daily total row for one display department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentTable {
    pub department: Department,
    pub rows: Vec<MatrixRow>,
    pub total: MatrixRow,
}

impl DepartmentTable {
    pub fn row(&self, label: &str) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Monthly item × day statistics for every department with data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMatrix {
    pub month: YearMonth,
    pub days_in_month: u32,
    pub window: BusinessWindow,
    /// Departments in display order; departments without items are omitted
    pub departments: Vec<DepartmentTable>,
}

impl MonthlyMatrix {
    pub fn department(&self, department: Department) -> Option<&DepartmentTable> {
        self.departments.iter().find(|t| t.department == department)
    }

    /// Keep only one department's table
    pub fn retain_department(&mut self, department: Department) {
        self.departments.retain(|t| t.department == department);
    }
}

/// One day of the rolling production trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u64,
}

/// Production attributed to one department
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentTotal {
    pub department: Department,
    pub count: u64,
}

/// Everything the dashboard view shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub trend: Vec<TrendPoint>,
    pub breakdown: Vec<DepartmentTotal>,
}
