//! CSV exports (report rows, monthly matrix)
//!
//! Both files start with a UTF-8 BOM so spreadsheet apps detect the encoding.

use crate::types::{LabtallyError, MatrixRow, MonthlyMatrix, Report, Result, YearMonth};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const REPORT_CSV_HEADERS: [&str; 12] = [
    "日付",
    "部署",
    "担当者",
    "項目名",
    "数量合計",
    "保険数",
    "保険完成",
    "自費数",
    "自費完成",
    "製作時間",
    "備考",
    "問題点",
];

/// Label of the per-department total line in the matrix CSV
pub const MATRIX_TOTAL_LABEL: &str = "【部署合計】";

fn csv_err(e: impl std::fmt::Display) -> LabtallyError {
    LabtallyError::Export(e.to_string())
}

fn new_writer(buf: Vec<u8>) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf)
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner().map_err(csv_err)
}

/// Encode records and append them to `out`
fn append_records<I>(out: Vec<u8>, records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = new_writer(out);
    for record in records {
        wtr.write_record(&record).map_err(csv_err)?;
    }
    finish(wtr)
}

/// One record without its line terminator
fn encode_fields(fields: &[String], style: QuoteStyle) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(fields).map_err(csv_err)?;
    let mut line = finish(wtr)?;
    line.pop();
    Ok(line)
}

/// One line per item of every report; reports without items produce no
/// lines. Remarks and issues are always quoted.
pub fn reports_csv(reports: &[Report]) -> Result<Vec<u8>> {
    let mut out = append_records(
        BOM.to_vec(),
        [REPORT_CSV_HEADERS.iter().map(|h| h.to_string()).collect()],
    )?;

    for report in reports {
        let free_text = encode_fields(
            &[report.remarks.clone(), report.issues.clone()],
            QuoteStyle::Always,
        )?;
        for item in &report.items {
            let counts = encode_fields(
                &[
                    report.date.clone(),
                    report.department.label().to_string(),
                    report.staff_name.clone(),
                    item.item_name.clone(),
                    item.count.to_string(),
                    item.count_insured.unwrap_or(0).to_string(),
                    item.count_insured_completed.unwrap_or(0).to_string(),
                    item.count_self.unwrap_or(0).to_string(),
                    item.count_self_completed.unwrap_or(0).to_string(),
                    item.time_minutes.unwrap_or(0).to_string(),
                ],
                QuoteStyle::Necessary,
            )?;
            out.extend_from_slice(&counts);
            out.push(b',');
            out.extend_from_slice(&free_text);
            out.push(b'\n');
        }
    }

    Ok(out)
}

fn matrix_line(department: &str, label: &str, row: &MatrixRow) -> Vec<String> {
    let mut line = Vec::with_capacity(row.daily.len() + 4);
    line.push(department.to_string());
    line.push(label.to_string());
    line.extend(row.daily.iter().map(u64::to_string));
    line.push(row.monthly_total.to_string());
    line.push(format!("{:.1}", row.average));
    line
}

/// Header, item lines and a total line per department, departments separated
/// by a blank line
pub fn matrix_csv(matrix: &MonthlyMatrix) -> Result<Vec<u8>> {
    let mut header = vec!["部署".to_string(), "品目".to_string()];
    header.extend((1..=matrix.days_in_month).map(|d| format!("{}日", d)));
    header.push("月合計".to_string());
    header.push("日平均".to_string());

    let mut out = append_records(BOM.to_vec(), [header])?;

    for table in &matrix.departments {
        let department = table.department.label();
        let lines = table
            .rows
            .iter()
            .map(|row| matrix_line(department, &row.label, row))
            .chain(std::iter::once(matrix_line(
                department,
                MATRIX_TOTAL_LABEL,
                &table.total,
            )));
        out = append_records(out, lines)?;
        out.push(b'\n');
    }

    Ok(out)
}

pub fn reports_csv_file_name(today: NaiveDate) -> String {
    format!("daily_reports_{}.csv", today.format("%Y-%m-%d"))
}

pub fn matrix_csv_file_name(month: YearMonth) -> String {
    format!("月間集計_{}年{}月.csv", month.year, month.month)
}

pub fn backup_file_name(epoch_millis: i64) -> String {
    format!("lab_reports_backup_{}.json", epoch_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calendar::HolidayCalendar;
    use crate::services::Aggregator;
    use crate::types::{DetailCounts, Department, ReportItem};

    fn make_report(department: Department, items: Vec<ReportItem>) -> Report {
        Report {
            id: "1".to_string(),
            date: "2026-01-13".to_string(),
            department,
            staff_name: "山田".to_string(),
            work_start_time: String::new(),
            work_end_time: String::new(),
            total_break_time_minutes: 0,
            items,
            remarks: "再製, 至急".to_string(),
            issues: String::new(),
            created_at: 0,
        }
    }

    fn as_text(bytes: Vec<u8>) -> String {
        let text = String::from_utf8(bytes).unwrap();
        text.strip_prefix('\u{FEFF}').unwrap().to_string()
    }

    // ========== reports_csv ==========

    #[test]
    fn test_reports_csv_starts_with_bom() {
        let bytes = reports_csv(&[]).unwrap();
        assert!(bytes.starts_with(BOM));
    }

    #[test]
    fn test_reports_csv_rows() {
        let report = make_report(
            Department::Denture,
            vec![
                ReportItem::detailed(
                    "ベース",
                    DetailCounts {
                        insured: 2,
                        insured_completed: 1,
                        self_pay: 3,
                        self_pay_completed: 0,
                        minutes: 40,
                    },
                ),
                ReportItem::simple("トレー", 1),
            ],
        );
        let text = as_text(reports_csv(&[report]).unwrap());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_CSV_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "2026-01-13,デンチャー,山田,ベース,5,2,1,3,0,40,\"再製, 至急\",\"\""
        );
        assert_eq!(
            lines[2],
            "2026-01-13,デンチャー,山田,トレー,1,0,0,0,0,0,\"再製, 至急\",\"\""
        );
    }

    #[test]
    fn test_reports_csv_quotes_free_text_always() {
        let mut report = make_report(Department::Pattern, vec![ReportItem::simple("HR", 1)]);
        report.staff_name = "佐藤, 花子".to_string();
        report.remarks = "研磨".to_string();
        report.issues = "気泡\"あり\"".to_string();
        let text = as_text(reports_csv(&[report]).unwrap());

        assert_eq!(
            text.lines().nth(1).unwrap(),
            "2026-01-13,パターン,\"佐藤, 花子\",HR,1,0,0,0,0,0,\"研磨\",\"気泡\"\"あり\"\"\""
        );
    }

    #[test]
    fn test_reports_without_items_are_skipped() {
        let text = as_text(reports_csv(&[make_report(Department::Pattern, Vec::new())]).unwrap());
        assert_eq!(text.lines().count(), 1);
    }

    // ========== matrix_csv ==========

    #[test]
    fn test_matrix_csv_layout() {
        let report = make_report(
            Department::Pattern,
            vec![ReportItem::simple("HR", 23), ReportItem::simple("FCK", 1)],
        );
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let matrix = Aggregator::monthly_matrix(
            &[report],
            YearMonth { year: 2026, month: 1 },
            today,
            &HolidayCalendar::default(),
        );
        let text = as_text(matrix_csv(&matrix).unwrap());
        let lines: Vec<&str> = text.lines().collect();

        let header: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(header.len(), 2 + 31 + 2);
        assert_eq!(header[2], "1日");
        assert_eq!(header[32], "31日");
        assert_eq!(header[34], "日平均");

        let hr: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(hr[0], "パターン");
        assert_eq!(hr[1], "HR");
        assert_eq!(hr[2 + 12], "23");
        assert_eq!(hr[33], "23");
        assert_eq!(hr[34], "1.0");

        let total: Vec<&str> = lines[3].split(',').collect();
        assert_eq!(total[1], MATRIX_TOTAL_LABEL);
        assert_eq!(total[33], "24");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_matrix_csv_empty_month_has_header_only() {
        let matrix = Aggregator::monthly_matrix(
            &[],
            YearMonth { year: 2026, month: 2 },
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            &HolidayCalendar::default(),
        );
        let text = as_text(matrix_csv(&matrix).unwrap());
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            reports_csv_file_name(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
            "daily_reports_2026-01-05.csv"
        );
        assert_eq!(
            matrix_csv_file_name(YearMonth { year: 2026, month: 1 }),
            "月間集計_2026年1月.csv"
        );
        assert_eq!(backup_file_name(42), "lab_reports_backup_42.json");
    }
}
