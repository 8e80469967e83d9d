//! Aggregator service for computing production statistics

use crate::services::bucketing::target_department;
use crate::services::calendar::HolidayCalendar;
use crate::services::normalizer::parse_work_date;
use crate::types::{
    BusinessWindow, DashboardData, Department, DepartmentTable, DepartmentTotal, MatrixRow,
    MonthlyMatrix, Report, TrendPoint, YearMonth,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of days in the dashboard trend, ending today
pub const TREND_DAYS: usize = 30;

/// Items of the model department whose name contains this marker already
/// subsume the other items; only they feed the department's daily total.
pub const TOTAL_MARKER: &str = "総数";

/// Per-department accumulation while building the matrix
struct DepartmentBucket {
    items: HashMap<String, Vec<u64>>,
    daily_total: Vec<u64>,
}

impl DepartmentBucket {
    fn new(days: usize) -> Self {
        Self {
            items: HashMap::new(),
            daily_total: vec![0; days],
        }
    }
}

/// Aggregator for computing production statistics
pub struct Aggregator;

impl Aggregator {
    /// Build the item × day matrix for `month`.
    ///
    /// `today` decides the averaging window (see [`HolidayCalendar::business_window`]).
    /// On-screen tables and the CSV export both render this value.
    pub fn monthly_matrix(
        reports: &[Report],
        month: YearMonth,
        today: NaiveDate,
        calendar: &HolidayCalendar,
    ) -> MonthlyMatrix {
        let days_in_month = month.days_in_month();
        let days = days_in_month as usize;
        let window = calendar.business_window(month, today);

        let mut buckets: HashMap<Department, DepartmentBucket> = HashMap::new();

        for report in Report::latest_per_id(reports) {
            let Some(date) = parse_work_date(&report.date) else {
                continue;
            };
            if YearMonth::of(date) != month {
                continue;
            }
            let day_index = date.day0() as usize;

            for item in &report.items {
                let target = target_department(report.department, &item.item_name);
                let bucket = buckets
                    .entry(target)
                    .or_insert_with(|| DepartmentBucket::new(days));

                let series = bucket
                    .items
                    .entry(item.item_name.clone())
                    .or_insert_with(|| vec![0; days]);
                series[day_index] = series[day_index].saturating_add(item.count);

                if Self::counts_toward_total(target, &item.item_name) {
                    bucket.daily_total[day_index] =
                        bucket.daily_total[day_index].saturating_add(item.count);
                }
            }
        }

        let departments = Department::ALL
            .into_iter()
            .filter_map(|department| {
                let bucket = buckets.remove(&department)?;
                if bucket.items.is_empty() {
                    return None;
                }
                Some(Self::department_table(department, bucket, &window))
            })
            .collect();

        MonthlyMatrix {
            month,
            days_in_month,
            window,
            departments,
        }
    }

    /// Whether an item's count is added into its display department's daily total
    pub fn counts_toward_total(department: Department, item_name: &str) -> bool {
        department != Department::OsakaModel || item_name.contains(TOTAL_MARKER)
    }

    /// Catalog items first in catalog order, then unknown items alphabetically
    pub fn order_items(department: Department, names: &mut [String]) {
        names.sort_by(|a, b| {
            match (
                department.catalog_position(a),
                department.catalog_position(b),
            ) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        });
    }

    fn department_table(
        department: Department,
        mut bucket: DepartmentBucket,
        window: &BusinessWindow,
    ) -> DepartmentTable {
        let mut names: Vec<String> = bucket.items.keys().cloned().collect();
        Self::order_items(department, &mut names);

        let rows = names
            .into_iter()
            .map(|name| {
                let daily = bucket.items.remove(&name).unwrap_or_default();
                Self::matrix_row(name, daily, window)
            })
            .collect();

        let total = Self::matrix_row(
            format!("{} 合計", department.label()),
            bucket.daily_total,
            window,
        );

        DepartmentTable {
            department,
            rows,
            total,
        }
    }

    fn matrix_row(label: String, daily: Vec<u64>, window: &BusinessWindow) -> MatrixRow {
        let monthly_total = daily.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        let business_total = window
            .active_days
            .iter()
            .filter_map(|&d| daily.get(d as usize - 1))
            .fold(0u64, |acc, v| acc.saturating_add(*v));
        let average = business_total as f64 / window.denominator.max(1) as f64;

        MatrixRow {
            label,
            daily,
            monthly_total,
            business_total,
            average,
        }
    }

    /// Daily production over the last `TREND_DAYS` days ending `today`
    /// (oldest first). Days without reports are zero.
    pub fn trend(reports: &[Report], today: NaiveDate) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = (0..TREND_DAYS as i64)
            .rev()
            .map(|back| TrendPoint {
                date: today - Duration::days(back),
                count: 0,
            })
            .collect();
        let index: HashMap<NaiveDate, usize> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.date, i))
            .collect();

        for report in Report::latest_per_id(reports) {
            let Some(date) = parse_work_date(&report.date) else {
                continue;
            };
            if let Some(&i) = index.get(&date) {
                points[i].count = points[i].count.saturating_add(report.total_count());
            }
        }

        points
    }

    /// Production per display department (nonzero only, largest first)
    pub fn department_breakdown(reports: &[Report]) -> Vec<DepartmentTotal> {
        let mut totals: HashMap<Department, u64> = HashMap::new();

        for report in Report::latest_per_id(reports) {
            for item in &report.items {
                let target = target_department(report.department, &item.item_name);
                let total = totals.entry(target).or_default();
                *total = total.saturating_add(item.count);
            }
        }

        let mut result: Vec<DepartmentTotal> = totals
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(department, count)| DepartmentTotal { department, count })
            .collect();
        result.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.department.cmp(&b.department))
        });
        result
    }

    pub fn dashboard(reports: &[Report], today: NaiveDate) -> DashboardData {
        DashboardData {
            trend: Self::trend(reports, today),
            breakdown: Self::department_breakdown(reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_report(id: &str, date: &str, department: Department, items: &[(&str, u64)]) -> Report {
        Report {
            id: id.to_string(),
            date: date.to_string(),
            department,
            staff_name: "テスト".to_string(),
            work_start_time: String::new(),
            work_end_time: String::new(),
            total_break_time_minutes: 0,
            items: items
                .iter()
                .map(|&(name, count)| ReportItem::simple(name, count))
                .collect(),
            remarks: String::new(),
            issues: String::new(),
            created_at: 0,
        }
    }

    fn january() -> YearMonth {
        YearMonth { year: 2026, month: 1 }
    }

    // ========== monthly_matrix() tests ==========

    #[test]
    fn test_matrix_empty_reports() {
        let calendar = HolidayCalendar::default();
        let matrix = Aggregator::monthly_matrix(&[], january(), date(2026, 1, 14), &calendar);

        assert!(matrix.departments.is_empty());
        assert_eq!(matrix.days_in_month, 31);
        // 7 business days before the 14th; averages would be x / 7
        assert_eq!(matrix.window.denominator, 7);
    }

    #[test]
    fn test_matrix_holiday_counts_but_not_averaged() {
        let calendar = HolidayCalendar::default();
        let reports = vec![make_report(
            "1",
            "2026-01-12",
            Department::CadCam,
            &[("CAD/CAM(設計)", 5)],
        )];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);

        let table = matrix.department(Department::CadCam).unwrap();
        let row = table.row("CAD/CAM(設計)").unwrap();
        assert_eq!(row.value(12), 5);
        assert_eq!(row.monthly_total, 5);
        assert_eq!(row.business_total, 0);
        assert!(!matrix.window.is_active(12));
        assert_eq!(matrix.window.denominator, 23);
        assert!((row.average - 0.0).abs() < f64::EPSILON);
        assert_eq!(table.total.value(12), 5);
    }

    #[test]
    fn test_matrix_average_uses_business_days() {
        let calendar = HolidayCalendar::default();
        let reports = vec![
            make_report("1", "2026-01-13", Department::Pattern, &[("HR", 10)]),
            make_report("2", "2026-01-14", Department::Pattern, &[("HR", 13)]),
        ];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);

        let row = matrix.department(Department::Pattern).unwrap().row("HR").unwrap();
        assert_eq!(row.business_total, 23);
        assert!((row.average - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matrix_current_month_excludes_today_from_average() {
        // Open question kept as documented: today's data shows in the month
        // total but not in the average, while the dashboard trend includes it.
        let calendar = HolidayCalendar::default();
        let today = date(2026, 1, 14);
        let reports = vec![make_report("1", "2026-01-14", Department::Pattern, &[("HR", 8)])];

        let matrix = Aggregator::monthly_matrix(&reports, january(), today, &calendar);
        let row = matrix.department(Department::Pattern).unwrap().row("HR").unwrap();
        assert_eq!(row.monthly_total, 8);
        assert_eq!(row.business_total, 0);

        let trend = Aggregator::trend(&reports, today);
        assert_eq!(trend.last().unwrap().count, 8);
    }

    #[test]
    fn test_matrix_filters_other_months() {
        let calendar = HolidayCalendar::default();
        let reports = vec![
            make_report("1", "2026-02-02", Department::Pattern, &[("HR", 3)]),
            make_report("2", "2025-01-13", Department::Pattern, &[("HR", 3)]),
            make_report("3", "not a date", Department::Pattern, &[("HR", 3)]),
        ];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);
        assert!(matrix.departments.is_empty());
    }

    #[test]
    fn test_matrix_normalizes_mixed_date_formats() {
        let calendar = HolidayCalendar::default();
        let reports = vec![
            make_report("1", "2026/1/13", Department::Pattern, &[("HR", 1)]),
            make_report("2", "2026-01-13", Department::Pattern, &[("HR", 2)]),
        ];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);
        let row = matrix.department(Department::Pattern).unwrap().row("HR").unwrap();
        assert_eq!(row.value(13), 3);
    }

    #[test]
    fn test_matrix_model_total_only_sums_total_items() {
        let calendar = HolidayCalendar::default();
        let mut report = make_report(
            "1",
            "2026-01-13",
            Department::OsakaModel,
            &[("ノーマル模型(総製作)", 3), ("貼り付け模型(総製作)", 4)],
        );
        report.recompute_model_totals();

        let matrix = Aggregator::monthly_matrix(&[report], january(), date(2026, 10, 18), &calendar);
        let table = matrix.department(Department::OsakaModel).unwrap();

        assert_eq!(table.row("総数(総製作)").unwrap().value(13), 7);
        assert_eq!(table.total.value(13), 7);
    }

    #[test]
    fn test_matrix_other_departments_sum_every_item() {
        let calendar = HolidayCalendar::default();
        let reports = vec![make_report(
            "1",
            "2026-01-13",
            Department::CompleteC,
            &[("クラウン", 2), ("総数メモ", 1), ("コア", 4)],
        )];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);
        assert_eq!(
            matrix.department(Department::CompleteC).unwrap().total.value(13),
            7
        );
    }

    #[test]
    fn test_matrix_reclassifies_cad_items() {
        let calendar = HolidayCalendar::default();
        let reports = vec![make_report(
            "1",
            "2026-01-13",
            Department::CompleteA,
            &[("CAD/CAM(スキャン)", 2), ("マウント(MB)", 3)],
        )];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);

        let complete_a = matrix.department(Department::CompleteA).unwrap();
        assert!(complete_a.row("CAD/CAM(スキャン)").is_none());
        assert_eq!(complete_a.total.value(13), 3);
        let cad = matrix.department(Department::CadCam).unwrap();
        assert_eq!(cad.row("CAD/CAM(スキャン)").unwrap().value(13), 2);
    }

    #[test]
    fn test_matrix_item_order_catalog_then_alphabetical() {
        let calendar = HolidayCalendar::default();
        let reports = vec![make_report(
            "1",
            "2026-01-13",
            Department::Pattern,
            &[("zeta", 1), ("コア", 1), ("alpha", 1), ("ハイブリッド", 1)],
        )];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);

        let labels: Vec<&str> = matrix
            .department(Department::Pattern)
            .unwrap()
            .rows
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, vec!["ハイブリッド", "コア", "alpha", "zeta"]);
    }

    #[test]
    fn test_matrix_departments_in_display_order() {
        let calendar = HolidayCalendar::default();
        let reports = vec![
            make_report("1", "2026-01-13", Department::Denture, &[("ベース", 1)]),
            make_report("2", "2026-01-13", Department::OsakaModel, &[("総数(急ぎ)", 1)]),
        ];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);
        let order: Vec<Department> = matrix.departments.iter().map(|t| t.department).collect();
        assert_eq!(order, vec![Department::OsakaModel, Department::Denture]);
    }

    // ========== trend() tests ==========

    #[test]
    fn test_trend_empty_has_thirty_zero_days() {
        let trend = Aggregator::trend(&[], date(2026, 3, 1));

        assert_eq!(trend.len(), TREND_DAYS);
        assert!(trend.iter().all(|p| p.count == 0));
        assert_eq!(trend.last().unwrap().date, date(2026, 3, 1));
        assert_eq!(trend.first().unwrap().date, date(2026, 1, 31));
    }

    #[test]
    fn test_trend_sums_reports_per_day() {
        let reports = vec![
            make_report("1", "2026-02-27", Department::Pattern, &[("HR", 2), ("FCK", 3)]),
            make_report("2", "2026/2/27", Department::Denture, &[("ベース", 1)]),
            make_report("3", "2025-12-01", Department::Pattern, &[("HR", 100)]),
        ];
        let trend = Aggregator::trend(&reports, date(2026, 3, 1));

        let day = trend.iter().find(|p| p.date == date(2026, 2, 27)).unwrap();
        assert_eq!(day.count, 6);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u64>(), 6);
    }

    // ========== department_breakdown() tests ==========

    #[test]
    fn test_breakdown_sorted_desc_nonzero_only() {
        let reports = vec![
            make_report("1", "2026-01-13", Department::Pattern, &[("HR", 2)]),
            make_report("2", "2026-01-13", Department::Denture, &[("ベース", 9)]),
            make_report("3", "2026-01-13", Department::InvestCut, &[("埋没", 0)]),
        ];
        let breakdown = Aggregator::department_breakdown(&reports);

        assert_eq!(
            breakdown,
            vec![
                DepartmentTotal { department: Department::Denture, count: 9 },
                DepartmentTotal { department: Department::Pattern, count: 2 },
            ]
        );
    }

    #[test]
    fn test_breakdown_and_matrix_agree_on_attribution() {
        let calendar = HolidayCalendar::default();
        let reports = vec![
            make_report(
                "1",
                "2026-01-13",
                Department::CompleteB,
                &[("CAD/CAM(設計)", 4), ("HJK", 2)],
            ),
            make_report(
                "2",
                "2026-01-14",
                Department::Denture,
                &[("CAD/CAM(スキャン)", 3), ("CAD/CAM(完成)", 1)],
            ),
            make_report(
                "3",
                "2026-01-15",
                Department::OsakaModel,
                &[("ノーマル模型【CAD】(総製作)", 5)],
            ),
        ];
        let matrix = Aggregator::monthly_matrix(&reports, january(), date(2026, 10, 18), &calendar);
        let breakdown = Aggregator::department_breakdown(&reports);

        for entry in &breakdown {
            let table = matrix.department(entry.department).unwrap();
            let matrix_sum: u64 = table.rows.iter().map(|r| r.monthly_total).sum();
            assert_eq!(matrix_sum, entry.count, "{}", entry.department);
        }
        let cad = breakdown
            .iter()
            .find(|d| d.department == Department::CadCam)
            .unwrap();
        assert_eq!(cad.count, 5);
    }

    #[test]
    fn test_duplicate_ids_counted_once_everywhere() {
        let mut first = make_report("1", "2026-01-13", Department::Pattern, &[("HR", 2)]);
        first.created_at = 1;
        let mut edited = make_report("1", "2026-01-13", Department::Pattern, &[("HR", 5)]);
        edited.created_at = 2;
        let reports = vec![first, edited];

        let breakdown = Aggregator::department_breakdown(&reports);
        assert_eq!(breakdown[0].count, 5);
        let trend = Aggregator::trend(&reports, date(2026, 1, 13));
        assert_eq!(trend.last().unwrap().count, 5);
    }
}
