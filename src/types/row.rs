//! Spreadsheet row types for the remote report store

use super::Report;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Column headers in the fixed order the store expects on save and returns on load
pub const SHEET_HEADERS: [&str; 17] = [
    "保存日時",
    "ID",
    "日付",
    "部署",
    "担当者",
    "項目名",
    "数量(合計)",
    "保険数",
    "保険完成",
    "自費数",
    "自費完成",
    "製作時間",
    "作業開始時刻",
    "作業終了時刻",
    "休憩(分)",
    "備考",
    "問題点",
];

/// Format used when stamping new saves: zero-padded so text order is time order
pub const SAVE_STAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// When a save-generation was written.
///
/// Ordered chronologically by the parsed value; stamps that do not parse sort
/// before any parsed stamp, and the raw text breaks ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveStamp {
    parsed: Option<NaiveDateTime>,
    raw: String,
}

fn loose_stamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})(?:[ T]+(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?)?",
        )
        .expect("save stamp regex is valid")
    })
}

impl SaveStamp {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let parsed = Self::parse_local(&raw);
        Self { parsed, raw }
    }

    /// Stamp for a save happening now
    pub fn now() -> Self {
        Self::from_local(Local::now().naive_local())
    }

    pub fn from_local(at: NaiveDateTime) -> Self {
        Self {
            parsed: Some(at),
            raw: at.format(SAVE_STAMP_FORMAT).to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn local_time(&self) -> Option<NaiveDateTime> {
        self.parsed
    }

    fn parse_local(raw: &str) -> Option<NaiveDateTime> {
        if raw.is_empty() {
            return None;
        }

        // Offset-carrying timestamps (what the sheet returns for date cells)
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).naive_local());
        }

        // Locale-style "2026/1/12 9:05:03", padded variants, bare dates
        let caps = loose_stamp_regex().captures(raw)?;
        let num = |i: usize| -> Option<u32> {
            caps.get(i)
                .map(|m| m.as_str().parse().ok())
                .unwrap_or(Some(0))
        };
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;
        date.and_hms_opt(num(4)?, num(5)?, num(6)?)
    }
}

impl Ord for SaveStamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for SaveStamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One row of the remote store: one item of one save-generation of a report
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub saved_at: SaveStamp,
    pub id: String,
    pub date: String,
    pub department: String,
    pub staff_name: String,
    /// Empty for the placeholder row of a report without items
    pub item_name: String,
    pub count: u64,
    pub count_insured: u64,
    pub count_insured_completed: u64,
    pub count_self: u64,
    pub count_self_completed: u64,
    pub time_minutes: u64,
    pub work_start_time: String,
    pub work_end_time: String,
    pub break_minutes: u64,
    pub remarks: String,
    pub issues: String,
}

impl SheetRow {
    /// Rows for one save of `report`: one per item, or a single placeholder
    /// row when the report has no items.
    pub fn for_report(report: &Report, saved_at: &SaveStamp) -> Vec<SheetRow> {
        let base = SheetRow {
            saved_at: saved_at.clone(),
            id: report.id.clone(),
            date: report.date.clone(),
            department: report.department.label().to_string(),
            staff_name: report.staff_name.clone(),
            item_name: String::new(),
            count: 0,
            count_insured: 0,
            count_insured_completed: 0,
            count_self: 0,
            count_self_completed: 0,
            time_minutes: 0,
            work_start_time: report.work_start_time.trim().to_string(),
            work_end_time: report.work_end_time.trim().to_string(),
            break_minutes: report.total_break_time_minutes,
            remarks: report.remarks.clone(),
            issues: report.issues.clone(),
        };

        if report.items.is_empty() {
            return vec![base];
        }

        report
            .items
            .iter()
            .map(|item| SheetRow {
                item_name: item.item_name.clone(),
                count: item.count,
                count_insured: item.count_insured.unwrap_or(0),
                count_insured_completed: item.count_insured_completed.unwrap_or(0),
                count_self: item.count_self.unwrap_or(0),
                count_self_completed: item.count_self_completed.unwrap_or(0),
                time_minutes: item.time_minutes.unwrap_or(0),
                ..base.clone()
            })
            .collect()
    }

    /// Scalar values in `SHEET_HEADERS` order
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.saved_at.as_str()),
            Value::from(self.id.as_str()),
            Value::from(self.date.as_str()),
            Value::from(self.department.as_str()),
            Value::from(self.staff_name.as_str()),
            Value::from(self.item_name.as_str()),
            Value::from(self.count),
            Value::from(self.count_insured),
            Value::from(self.count_insured_completed),
            Value::from(self.count_self),
            Value::from(self.count_self_completed),
            Value::from(self.time_minutes),
            Value::from(self.work_start_time.as_str()),
            Value::from(self.work_end_time.as_str()),
            Value::from(self.break_minutes),
            Value::from(self.remarks.as_str()),
            Value::from(self.issues.as_str()),
        ]
    }

    pub fn is_placeholder(&self) -> bool {
        self.item_name.trim().is_empty()
    }
}
