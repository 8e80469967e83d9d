//! Backup file parser (JSON array of reports, or a single report object)

use crate::types::{LabtallyError, Report, Result};
use serde_json::Value;

/// Parse a backup payload. The buffer is parsed in place.
pub fn parse_backup(body: &mut [u8]) -> Result<Vec<Report>> {
    let value: Value = simd_json::from_slice(body)
        .map_err(|e| LabtallyError::Parse(format!("backup is not valid JSON: {}", e)))?;

    match value {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                serde_json::from_value(entry)
                    .map_err(|e| LabtallyError::Parse(format!("backup entry {}: {}", i, e)))
            })
            .collect(),
        Value::Object(_) => serde_json::from_value(value)
            .map(|report| vec![report])
            .map_err(|e| LabtallyError::Parse(format!("backup report: {}", e))),
        _ => Err(LabtallyError::Parse(
            "backup must be a report or an array of reports".into(),
        )),
    }
}
