//! Latest-write deduplication of store rows
//!
//! Each save appends rows to the store instead of replacing the previous
//! ones, so one report id can have several save-generations. Only the rows of
//! the newest generation are kept and reassembled into a single report:
//!
//! `group_by_id` → `pick_latest` → `flatten_items`
//!
//! Each step is linear in its input.

use crate::services::normalizer::normalize_date;
use crate::types::{Department, Report, ReportItem, SheetRow};
use std::collections::HashMap;
use tracing::warn;

/// Group rows by report id, keeping first-seen id order and row order.
/// Rows with a blank id are dropped.
pub fn group_by_id(rows: Vec<SheetRow>) -> Vec<(String, Vec<SheetRow>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<SheetRow>)> = Vec::new();

    for row in rows {
        let id = row.id.trim().to_string();
        if id.is_empty() {
            continue;
        }
        match index.get(&id) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(id.clone(), groups.len());
                groups.push((id, vec![row]));
            }
        }
    }

    groups
}

/// Keep only the rows of the newest save-generation, in their original order
pub fn pick_latest(rows: Vec<SheetRow>) -> Vec<SheetRow> {
    let Some(latest) = rows.iter().map(|r| &r.saved_at).max().cloned() else {
        return rows;
    };
    rows.into_iter().filter(|r| r.saved_at == latest).collect()
}

/// Reassemble one generation's rows into a report.
///
/// Header fields come from the first row; every non-placeholder row becomes
/// an item. Returns `None` when the department is not recognised.
pub fn flatten_items(id: String, rows: &[SheetRow]) -> Option<Report> {
    let first = rows.first()?;
    let Some(department) = Department::from_label(&first.department) else {
        warn!(id = %id, department = %first.department, "Skipping report with unknown department");
        return None;
    };

    let items = rows
        .iter()
        .filter(|r| !r.is_placeholder())
        .map(|r| {
            let mut item = ReportItem::simple(r.item_name.clone(), r.count);
            item.count_insured = Some(r.count_insured);
            item.count_insured_completed = Some(r.count_insured_completed);
            item.count_self = Some(r.count_self);
            item.count_self_completed = Some(r.count_self_completed);
            item.time_minutes = Some(r.time_minutes);
            item
        })
        .collect();

    Some(Report {
        id,
        date: normalize_date(&first.date),
        department,
        staff_name: first.staff_name.clone(),
        work_start_time: first.work_start_time.clone(),
        work_end_time: first.work_end_time.clone(),
        total_break_time_minutes: first.break_minutes,
        items,
        remarks: first.remarks.clone(),
        issues: first.issues.clone(),
        created_at: first
            .saved_at
            .local_time()
            .map(|t| t.and_utc().timestamp_millis())
            .unwrap_or(0),
    })
}

/// Full reduction: one report per id, newest generation only, sorted by
/// work date descending (stable for equal dates).
pub fn reports_from_rows(rows: Vec<SheetRow>) -> Vec<Report> {
    let mut reports: Vec<Report> = group_by_id(rows)
        .into_iter()
        .filter_map(|(id, group)| flatten_items(id, &pick_latest(group)))
        .collect();
    reports.sort_by(|a, b| b.date.cmp(&a.date));
    reports
}
