//! Report lifecycle: create, edit, delete, reset, sync
//!
//! The local cache is authoritative. Every mutation is applied locally first
//! and then mirrored to the remote store once; the remote outcome is returned
//! to the caller and never retried.

use crate::services::cache::ReportRepository;
use crate::services::dedup::reports_from_rows;
use crate::services::store::ReportStore;
use crate::types::{
    Department, LabtallyError, Report, ReportItem, Result, SaveStamp, StoreResult,
};
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// A report as entered, before it has an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub date: String,
    pub department: Department,
    pub staff_name: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub total_break_time_minutes: u64,
    pub items: Vec<ReportItem>,
    pub remarks: String,
    pub issues: String,
}

impl NewReport {
    /// Assign id and creation time from `now`, drop zero-count items and
    /// rebuild the model-department totals.
    pub fn into_report(self, now: DateTime<Local>) -> Report {
        let millis = now.timestamp_millis();
        self.build(millis.to_string(), millis)
    }

    /// Same as [`NewReport::into_report`] but keeping an existing id
    pub fn into_revision(self, id: String, now: DateTime<Local>) -> Report {
        self.build(id, now.timestamp_millis())
    }

    fn build(self, id: String, created_at: i64) -> Report {
        let mut report = Report {
            id,
            date: self.date,
            department: self.department,
            staff_name: self.staff_name,
            work_start_time: self.work_start_time,
            work_end_time: self.work_end_time,
            total_break_time_minutes: self.total_break_time_minutes,
            items: self.items.into_iter().filter(|i| i.count > 0).collect(),
            remarks: self.remarks,
            issues: self.issues,
            created_at,
        };
        report.recompute_model_totals();
        report
    }
}

/// A local change that was applied, and what the remote store said about it
#[derive(Debug)]
pub struct WriteOutcome<T> {
    pub local: T,
    pub remote: StoreResult<()>,
}

impl<T> WriteOutcome<T> {
    pub fn mirrored(&self) -> bool {
        self.remote.is_ok()
    }
}

pub struct ReportService<R, S> {
    cache: R,
    store: S,
}

impl<R: ReportRepository, S: ReportStore> ReportService<R, S> {
    pub fn new(cache: R, store: S) -> Self {
        Self { cache, store }
    }

    pub fn cache(&self) -> &R {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reports(&self) -> Result<Vec<Report>> {
        self.cache.all()
    }

    /// Reports whose staff name or department name contains `text`
    pub fn search(&self, text: Option<&str>) -> Result<Vec<Report>> {
        let reports = self.cache.all()?;
        let needle = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(reports),
        };
        Ok(reports
            .into_iter()
            .filter(|r| r.staff_name.contains(needle) || r.department.label().contains(needle))
            .collect())
    }

    /// Create and save a new report
    pub fn submit(&self, draft: NewReport, now: DateTime<Local>) -> Result<WriteOutcome<Report>> {
        let report = draft.into_report(now);
        let outcome = self.save(&report, now)?;
        Ok(WriteOutcome {
            local: report,
            remote: outcome.remote,
        })
    }

    /// Replace the contents of the cached report `id`, keeping its id
    pub fn edit(
        &self,
        id: &str,
        draft: NewReport,
        now: DateTime<Local>,
    ) -> Result<WriteOutcome<Report>> {
        if self.cache.get(id)?.is_none() {
            return Err(LabtallyError::NotFound(id.to_string()));
        }
        let report = draft.into_revision(id.to_string(), now);
        let outcome = self.save(&report, now)?;
        Ok(WriteOutcome {
            local: report,
            remote: outcome.remote,
        })
    }

    /// Save (or re-save an edited) report under its id with a fresh save stamp
    pub fn save(&self, report: &Report, now: DateTime<Local>) -> Result<WriteOutcome<()>> {
        self.cache.save(report)?;
        let stamp = SaveStamp::from_local(now.naive_local());
        let remote = self.store.save(report, &stamp);
        if let Err(e) = &remote {
            warn!(id = %report.id, error = %e, "Report saved locally only");
        }
        Ok(WriteOutcome { local: (), remote })
    }

    /// Delete locally and remotely. `local` is whether the cache had the id.
    pub fn delete(&self, id: &str) -> Result<WriteOutcome<bool>> {
        let removed = self.cache.delete(id)?;
        let remote = self.store.delete(id);
        if let Err(e) = &remote {
            warn!(id = %id, error = %e, "Report deleted locally only");
        }
        Ok(WriteOutcome {
            local: removed,
            remote,
        })
    }

    /// Full data reset
    pub fn clear_all(&self) -> Result<WriteOutcome<()>> {
        self.cache.clear()?;
        let remote = self.store.clear();
        if let Err(e) = &remote {
            warn!(error = %e, "Local cache cleared, remote store not cleared");
        }
        Ok(WriteOutcome { local: (), remote })
    }

    /// Replace the cache with the store's deduplicated contents.
    ///
    /// A store failure leaves the cache untouched and is returned as the
    /// inner error; the outer error is for local failures only.
    pub fn sync(&self) -> Result<StoreResult<usize>> {
        let rows = match self.store.load() {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Sync failed, keeping local cache");
                return Ok(Err(e));
            }
        };

        let row_count = rows.len();
        let reports = reports_from_rows(rows);
        self.cache.replace_all(&reports)?;
        info!(rows = row_count, reports = reports.len(), "Synced from store");
        Ok(Ok(reports.len()))
    }
}
