//! Report and item types

use super::Department;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Synthetic model-department item holding the urgent subtotal
pub const MODEL_URGENT_TOTAL: &str = "総数(急ぎ)";
/// Synthetic model-department item holding the full production total
pub const MODEL_GRAND_TOTAL: &str = "総数(総製作)";

const MODEL_URGENT_PARTS: [&str; 3] = [
    "ノーマル模型(急ぎ)",
    "貼り付け模型(急ぎ)",
    "インレー・コア模型(急ぎ)",
];
const MODEL_GRAND_PARTS: [&str; 3] = [
    "ノーマル模型(総製作)",
    "貼り付け模型(総製作)",
    "インレー・コア模型(総製作)",
];

/// Browser backups carry `null` where this crate expects an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A JSON value as a non-negative count. Numeric strings are accepted and
/// fractions rounded; anything else (including negatives and NaN) is 0.
pub fn count_from_value(value: &Value) -> u64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    }
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| count_from_value(&v))
}

fn lenient_optional_count<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| match v {
        Value::Null => None,
        other => Some(count_from_value(&other)),
    })
}

fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let millis = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(millis.unwrap_or(0))
}

/// One staff member's production record for one date and department
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    /// Work date as entered; normalize before aggregating
    pub date: String,
    pub department: Department,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub staff_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_start_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_end_time: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_break_time_minutes: u64,
    #[serde(default)]
    pub items: Vec<ReportItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issues: String,
    /// Client creation time (epoch millis). Local ordering only.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub created_at: i64,
}

/// One production line within a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item_name: String,
    /// Total quantity (insured + self when subcounts exist)
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub count_insured: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub count_insured_completed: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub count_self: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub count_self_completed: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_minutes: Option<u64>,
}

/// Insured/self-pay breakdown entered for denture items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetailCounts {
    pub insured: u64,
    pub insured_completed: u64,
    pub self_pay: u64,
    pub self_pay_completed: u64,
    pub minutes: u64,
}

impl ReportItem {
    pub fn simple(item_name: impl Into<String>, count: u64) -> Self {
        Self {
            item_name: item_name.into(),
            count,
            ..Default::default()
        }
    }

    /// Detailed item; `count` is derived as insured + self-pay.
    pub fn detailed(item_name: impl Into<String>, detail: DetailCounts) -> Self {
        Self {
            item_name: item_name.into(),
            count: detail.insured.saturating_add(detail.self_pay),
            count_insured: Some(detail.insured),
            count_insured_completed: Some(detail.insured_completed),
            count_self: Some(detail.self_pay),
            count_self_completed: Some(detail.self_pay_completed),
            time_minutes: Some(detail.minutes),
        }
    }
}

impl Report {
    /// Sum of every item count in this report
    pub fn total_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.count))
    }

    /// Rebuild the synthetic 総数 items of a model-department report from
    /// their constituents. A zero total removes the item. No-op for other
    /// departments.
    pub fn recompute_model_totals(&mut self) {
        if self.department != Department::OsakaModel {
            return;
        }

        let sum_of = |items: &[ReportItem], parts: &[&str]| -> u64 {
            items
                .iter()
                .filter(|i| parts.contains(&i.item_name.as_str()))
                .fold(0u64, |acc, i| acc.saturating_add(i.count))
        };

        let urgent = sum_of(&self.items, &MODEL_URGENT_PARTS);
        let grand = sum_of(&self.items, &MODEL_GRAND_PARTS);

        self.set_synthetic(MODEL_URGENT_TOTAL, urgent);
        self.set_synthetic(MODEL_GRAND_TOTAL, grand);
    }

    fn set_synthetic(&mut self, name: &str, value: u64) {
        self.items.retain(|i| i.item_name != name);
        if value > 0 {
            self.items.push(ReportItem::simple(name, value));
        }
    }

    /// Collapse repeated ids to the copy with the latest `created_at`
    /// (later position wins ties). Output keeps first-seen id order.
    pub fn latest_per_id(reports: &[Report]) -> Vec<&Report> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(reports.len());
        let mut latest: Vec<&Report> = Vec::with_capacity(reports.len());

        for report in reports {
            match index.get(report.id.as_str()) {
                Some(&slot) => {
                    if report.created_at >= latest[slot].created_at {
                        latest[slot] = report;
                    }
                }
                None => {
                    index.insert(report.id.as_str(), latest.len());
                    latest.push(report);
                }
            }
        }

        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_report(id: &str, department: Department, items: Vec<ReportItem>) -> Report {
        Report {
            id: id.to_string(),
            date: "2026-01-13".to_string(),
            department,
            staff_name: "西口".to_string(),
            work_start_time: String::new(),
            work_end_time: String::new(),
            total_break_time_minutes: 60,
            items,
            remarks: String::new(),
            issues: String::new(),
            created_at: 0,
        }
    }

    fn count_of(report: &Report, name: &str) -> Option<u64> {
        report
            .items
            .iter()
            .find(|i| i.item_name == name)
            .map(|i| i.count)
    }

    #[test]
    fn test_detailed_count_is_insured_plus_self() {
        let item = ReportItem::detailed(
            "ベース",
            DetailCounts {
                insured: 3,
                insured_completed: 2,
                self_pay: 4,
                self_pay_completed: 1,
                minutes: 90,
            },
        );
        assert_eq!(item.count, 7);
        assert_eq!(item.count_self_completed, Some(1));
        assert_eq!(ReportItem::simple("ベース", 1).count_insured, None);
    }

    #[test]
    fn test_recompute_model_totals_grand() {
        let mut report = make_report(
            "1",
            Department::OsakaModel,
            vec![
                ReportItem::simple("ノーマル模型(総製作)", 3),
                ReportItem::simple("貼り付け模型(総製作)", 4),
            ],
        );
        report.recompute_model_totals();

        assert_eq!(count_of(&report, MODEL_GRAND_TOTAL), Some(7));
        // no urgent constituents → no urgent total item
        assert_eq!(count_of(&report, MODEL_URGENT_TOTAL), None);
    }

    #[test]
    fn test_recompute_model_totals_replaces_stale_values() {
        let mut report = make_report(
            "1",
            Department::OsakaModel,
            vec![
                ReportItem::simple("ノーマル模型(急ぎ)", 2),
                ReportItem::simple(MODEL_URGENT_TOTAL, 99),
                ReportItem::simple(MODEL_GRAND_TOTAL, 50),
            ],
        );
        report.recompute_model_totals();

        assert_eq!(count_of(&report, MODEL_URGENT_TOTAL), Some(2));
        assert_eq!(count_of(&report, MODEL_GRAND_TOTAL), None);
        assert_eq!(report.items.len(), 2);
    }

    #[test]
    fn test_recompute_ignores_other_departments() {
        let mut report = make_report(
            "1",
            Department::Pattern,
            vec![ReportItem::simple("ノーマル模型(総製作)", 3)],
        );
        report.recompute_model_totals();
        assert_eq!(report.items.len(), 1);
    }

    #[test]
    fn test_deserialize_browser_backup_shape() {
        let json = r#"{
            "id": "1736640000000",
            "date": "2026-01-12",
            "department": "CAD/CAM",
            "staffName": "木村",
            "startTime": "",
            "endTime": "",
            "totalBreakTimeMinutes": 60,
            "items": [{"itemId": "s-0-1", "itemName": "CAD/CAM(設計)", "count": 5, "timeMinutes": 0}],
            "remarks": "",
            "issues": null,
            "createdAt": 1736640000000
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.department, Department::CadCam);
        assert_eq!(report.items[0].count, 5);
        assert_eq!(report.items[0].time_minutes, Some(0));
        assert_eq!(report.issues, "");
        assert_eq!(report.total_count(), 5);
    }

    #[test]
    fn test_deserialize_tolerates_loose_counts() {
        let json = r#"{
            "id": "7",
            "date": "2026-01-12",
            "department": "パターン",
            "totalBreakTimeMinutes": "45",
            "items": [
                {"itemName": "HR", "count": 2.5, "countInsured": null},
                {"itemName": "FCK", "count": null, "countSelf": -1},
                {"itemName": "FCK", "count": "3", "timeMinutes": 1e20}
            ],
            "createdAt": 1736640000000.0
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_break_time_minutes, 45);
        assert_eq!(report.items[0].count, 3);
        assert_eq!(report.items[0].count_insured, None);
        assert_eq!(report.items[1].count, 0);
        assert_eq!(report.items[1].count_self, Some(0));
        assert_eq!(report.items[2].count, 3);
        assert_eq!(report.items[2].time_minutes, Some(u64::MAX));
        assert_eq!(report.created_at, 1_736_640_000_000);
    }

    #[test]
    fn test_latest_per_id_keeps_latest_created_at() {
        let mut old = make_report("a", Department::Pattern, vec![ReportItem::simple("HR", 1)]);
        old.created_at = 10;
        let mut new = make_report("a", Department::Pattern, vec![ReportItem::simple("HR", 5)]);
        new.created_at = 20;
        let other = make_report("b", Department::Pattern, vec![]);

        let reports = vec![new.clone(), other, old];
        let latest = Report::latest_per_id(&reports);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "a");
        assert_eq!(latest[0].total_count(), 5);
        assert_eq!(latest[1].id, "b");
    }
}
