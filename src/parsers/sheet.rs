//! Report store load-response parser
//!
//! The store answers `{"status": "success", "data": [{header: value, ...}]}`
//! where each object is one sheet row keyed by the column headers. Cell values
//! come back as strings, numbers, ISO timestamps or null depending on how the
//! spreadsheet typed the cell.

use crate::types::{count_from_value, SaveStamp, SheetRow, StoreFailure, StoreResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Status value of a successful response
pub const STATUS_SUCCESS: &str = "success";

/// Count column written by older versions of the form
const LEGACY_COUNT_HEADER: &str = "数量";

#[derive(Deserialize)]
struct LoadResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<HashMap<String, Value>>>,
}

/// Parse a raw load response body into sheet rows.
///
/// The buffer is parsed in place (simd-json mutates its input).
pub fn parse_load_response(body: &mut [u8]) -> StoreResult<Vec<SheetRow>> {
    let response: LoadResponse =
        simd_json::from_slice(body).map_err(|e| StoreFailure::BadPayload(e.to_string()))?;

    match response.status.as_deref() {
        Some(STATUS_SUCCESS) => {}
        Some(other) => {
            let detail = response
                .message
                .map(|m| format!("{}: {}", other, m))
                .unwrap_or_else(|| other.to_string());
            return Err(StoreFailure::Remote(detail));
        }
        None => return Err(StoreFailure::BadPayload("missing status field".into())),
    }

    let records = response.data.unwrap_or_default();
    debug!(rows = records.len(), "Parsed store load response");
    Ok(records.iter().map(row_from_record).collect())
}

/// Build one row from a header-keyed record; missing cells default to empty/0
pub fn row_from_record(record: &HashMap<String, Value>) -> SheetRow {
    let text = |header: &str| cell_text(record.get(header));
    let count = |header: &str| cell_count(record.get(header));

    let total = match record.get("数量(合計)") {
        Some(v) if !v.is_null() => cell_count(Some(v)),
        _ => cell_count(record.get(LEGACY_COUNT_HEADER)),
    };

    SheetRow {
        saved_at: SaveStamp::parse(&text("保存日時")),
        id: text("ID").trim().to_string(),
        date: text("日付"),
        department: text("部署").trim().to_string(),
        staff_name: text("担当者"),
        item_name: text("項目名"),
        count: total,
        count_insured: count("保険数"),
        count_insured_completed: count("保険完成"),
        count_self: count("自費数"),
        count_self_completed: count("自費完成"),
        time_minutes: count("製作時間"),
        work_start_time: text("作業開始時刻"),
        work_end_time: text("作業終了時刻"),
        break_minutes: count("休憩(分)"),
        remarks: text("備考"),
        issues: text("問題点"),
    }
}

/// Cell as text: strings verbatim, numbers and booleans printed, null empty
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Cell as a non-negative count; a missing cell is 0
pub fn cell_count(value: Option<&Value>) -> u64 {
    value.map(count_from_value).unwrap_or(0)
}
