//! `labtally add` subcommand for entering a daily report

use clap::Args;

use crate::services::normalizer::{normalize_date, parse_work_date};
use crate::services::NewReport;
use crate::types::{DetailCounts, Department, LabtallyError, ReportItem, Result};

/// Enter a daily report
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Work date (YYYY-MM-DD or YYYY/M/D)
    #[arg(long)]
    pub date: String,

    /// Department name or code (e.g. CAD_CAM)
    #[arg(long)]
    pub department: Department,

    /// Staff name
    #[arg(long)]
    pub staff: String,

    /// Work start time (HH:MM)
    #[arg(long, default_value = "")]
    pub start: String,

    /// Work end time (HH:MM)
    #[arg(long, default_value = "")]
    pub end: String,

    /// Total break in minutes
    #[arg(long = "break", default_value_t = 0)]
    pub break_minutes: u64,

    /// Item as NAME=COUNT (repeatable)
    #[arg(long = "item", value_name = "NAME=COUNT", value_parser = parse_item)]
    pub items: Vec<ReportItem>,

    /// Detailed item as NAME=INSURED/INSURED_DONE/SELF/SELF_DONE[/MINUTES] (repeatable)
    #[arg(long = "detail", value_name = "NAME=I/ID/S/SD[/MIN]", value_parser = parse_detail)]
    pub details: Vec<ReportItem>,

    #[arg(long, default_value = "")]
    pub remarks: String,

    #[arg(long, default_value = "")]
    pub issues: String,
}

impl AddArgs {
    pub fn into_draft(self) -> Result<NewReport> {
        if parse_work_date(&self.date).is_none() {
            return Err(LabtallyError::Parse(format!(
                "invalid date '{}', expected YYYY-MM-DD",
                self.date
            )));
        }
        if self.staff.trim().is_empty() {
            return Err(LabtallyError::Parse("staff name is required".into()));
        }

        let mut items = self.items;
        items.extend(self.details);

        Ok(NewReport {
            date: normalize_date(&self.date),
            department: self.department,
            staff_name: self.staff.trim().to_string(),
            work_start_time: self.start,
            work_end_time: self.end,
            total_break_time_minutes: self.break_minutes,
            items,
            remarks: self.remarks,
            issues: self.issues,
        })
    }
}

fn split_name(input: &str) -> std::result::Result<(&str, &str), String> {
    let (name, value) = input
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", input))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing item name in '{}'", input));
    }
    Ok((name, value.trim()))
}

fn parse_number(value: &str) -> std::result::Result<u64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a count", value))
}

/// `NAME=COUNT`
pub fn parse_item(input: &str) -> std::result::Result<ReportItem, String> {
    let (name, value) = split_name(input)?;
    Ok(ReportItem::simple(name, parse_number(value)?))
}

/// `NAME=INSURED/INSURED_DONE/SELF/SELF_DONE[/MINUTES]`
pub fn parse_detail(input: &str) -> std::result::Result<ReportItem, String> {
    let (name, value) = split_name(input)?;
    let numbers = value
        .split('/')
        .map(parse_number)
        .collect::<std::result::Result<Vec<u64>, String>>()?;

    let minutes = match numbers.len() {
        4 => 0,
        5 => numbers[4],
        _ => {
            return Err(format!(
                "expected 4 or 5 '/'-separated counts in '{}'",
                input
            ))
        }
    };

    Ok(ReportItem::detailed(
        name,
        DetailCounts {
            insured: numbers[0],
            insured_completed: numbers[1],
            self_pay: numbers[2],
            self_pay_completed: numbers[3],
            minutes,
        },
    ))
}
