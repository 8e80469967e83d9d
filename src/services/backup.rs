//! Backup import, merge and export for the local cache

use crate::parsers::parse_backup;
use crate::services::cache::ReportRepository;
use crate::types::{LabtallyError, Report, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Outcome of merging a backup into the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MergeSummary {
    pub added: usize,
    /// Incoming reports whose id was already cached (left untouched)
    pub skipped: usize,
}

/// Replace the whole cache with the backup contents
pub fn import_replace(repo: &dyn ReportRepository, payload: &mut [u8]) -> Result<usize> {
    let reports = parse_backup(payload)?;
    repo.replace_all(&reports)?;
    info!(count = reports.len(), "Imported backup (replace)");
    Ok(reports.len())
}

/// Union by id. Existing reports win; incoming duplicates are dropped, not
/// overwritten, including duplicates within the backup itself.
pub fn merge(repo: &dyn ReportRepository, payload: &mut [u8]) -> Result<MergeSummary> {
    let incoming = parse_backup(payload)?;
    let mut reports = repo.all()?;
    let mut known: HashSet<String> = reports.iter().map(|r| r.id.clone()).collect();

    let mut summary = MergeSummary::default();
    for report in incoming {
        if known.insert(report.id.clone()) {
            reports.push(report);
            summary.added += 1;
        } else {
            summary.skipped += 1;
        }
    }

    if summary.added > 0 {
        repo.replace_all(&reports)?;
    }
    info!(added = summary.added, skipped = summary.skipped, "Merged backup");
    Ok(summary)
}

/// Serialize the whole cache as a backup payload
pub fn export_json(repo: &dyn ReportRepository) -> Result<String> {
    let reports: Vec<Report> = repo.all()?;
    serde_json::to_string_pretty(&reports)
        .map_err(|e| LabtallyError::Export(format!("backup serialization failed: {}", e)))
}
