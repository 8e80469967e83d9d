//! Plain-text rendering for terminal output

use crate::types::{DashboardData, MatrixRow, MonthlyMatrix, Report};
use std::fmt::Write;

const BAR_WIDTH: u64 = 40;

fn daily_cells(row: &MatrixRow) -> String {
    row.daily
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0)
        .map(|(i, v)| format!("{}日:{}", i + 1, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn matrix_line(out: &mut String, label: &str, row: &MatrixRow) {
    let _ = writeln!(
        out,
        "  {:<36} 月合計 {:>6}  日平均 {:>6.1}  {}",
        label,
        row.monthly_total,
        row.average,
        daily_cells(row)
    );
}

pub fn matrix(matrix: &MonthlyMatrix) -> String {
    let mut out = String::new();
    let window = &matrix.window;
    let _ = writeln!(
        out,
        "{} 月間集計 (営業日 {} 日{})",
        matrix.month,
        window.denominator,
        if window.in_progress { ", 本日除く" } else { "" }
    );

    if matrix.departments.is_empty() {
        out.push_str("データがありません\n");
        return out;
    }

    for table in &matrix.departments {
        let _ = writeln!(out, "\n[{}]", table.department);
        for row in &table.rows {
            matrix_line(&mut out, &row.label, row);
        }
        matrix_line(&mut out, &table.total.label, &table.total);
    }
    out
}

pub fn dashboard(data: &DashboardData) -> String {
    let mut out = String::new();
    let max = data.trend.iter().map(|p| p.count).max().unwrap_or(0).max(1);

    out.push_str("直近30日の製作数\n");
    for point in &data.trend {
        let width = (u128::from(point.count) * u128::from(BAR_WIDTH))
            .div_ceil(u128::from(max)) as usize;
        let _ = writeln!(
            out,
            "  {} {:>6} {}",
            point.date.format("%m/%d"),
            point.count,
            "█".repeat(width)
        );
    }

    out.push_str("\n部署別製作数\n");
    if data.breakdown.is_empty() {
        out.push_str("  データがありません\n");
    }
    for entry in &data.breakdown {
        let _ = writeln!(out, "  {:<20} {:>8}", entry.department, entry.count);
    }
    out
}

pub fn report_list(reports: &[Report]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "{}  {:<16} {:<10} {:>3}品目 計{:>5}  [{}]",
            report.date,
            report.department,
            report.staff_name,
            report.items.len(),
            report.total_count(),
            report.id
        );
    }
    let _ = writeln!(out, "{} 件", reports.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Aggregator, HolidayCalendar};
    use crate::types::{Department, ReportItem, YearMonth};
    use chrono::NaiveDate;

    fn make_report() -> Report {
        Report {
            id: "42".to_string(),
            date: "2026-01-13".to_string(),
            department: Department::CadCam,
            staff_name: "木村".to_string(),
            work_start_time: String::new(),
            work_end_time: String::new(),
            total_break_time_minutes: 0,
            items: vec![ReportItem::simple("IOS", 3)],
            remarks: String::new(),
            issues: String::new(),
            created_at: 0,
        }
    }

    #[test]
    fn test_matrix_text_shows_nonzero_days() {
        let matrix = Aggregator::monthly_matrix(
            &[make_report()],
            YearMonth { year: 2026, month: 1 },
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            &HolidayCalendar::default(),
        );
        let text = super::matrix(&matrix);
        assert!(text.contains("[CAD/CAM]"));
        assert!(text.contains("13日:3"));
        assert!(!text.contains("12日:"));
    }

    #[test]
    fn test_empty_matrix_text() {
        let matrix = Aggregator::monthly_matrix(
            &[],
            YearMonth { year: 2026, month: 1 },
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            &HolidayCalendar::default(),
        );
        assert!(super::matrix(&matrix).contains("データがありません"));
    }

    #[test]
    fn test_dashboard_text_has_thirty_lines_of_trend() {
        let data = Aggregator::dashboard(&[], NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        let text = dashboard(&data);
        let trend_lines = text.lines().skip(1).take_while(|l| !l.is_empty()).count();
        assert_eq!(trend_lines, 30);
    }

    #[test]
    fn test_dashboard_bar_for_saturated_count() {
        let mut report = make_report();
        report.date = "2026-01-31".to_string();
        report.items = vec![ReportItem::simple("IOS", u64::MAX)];
        let data = Aggregator::dashboard(&[report], NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());

        let text = dashboard(&data);
        let last = text.lines().nth(30).unwrap();
        assert!(last.ends_with(&"█".repeat(BAR_WIDTH as usize)));
    }

    #[test]
    fn test_report_list() {
        let text = report_list(&[make_report()]);
        assert!(text.contains("[42]"));
        assert!(text.ends_with("1 件\n"));
    }
}
