//! Local report cache
//!
//! The cache is the authoritative copy of reports on this machine. It is a
//! JSON array of reports in `reports.json` under the data directory, written
//! atomically and guarded by file locks so concurrent invocations do not
//! interleave.

use crate::types::{CacheWarning, LabtallyError, Report, Result};
use directories::BaseDirs;
use fs2::FileExt;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// File name of the cache inside the data directory
pub const CACHE_FILE: &str = "reports.json";

/// Storage seam for the report service
pub trait ReportRepository {
    /// All cached reports, most recently saved first
    fn all(&self) -> Result<Vec<Report>>;

    fn get(&self, id: &str) -> Result<Option<Report>> {
        Ok(self.all()?.into_iter().find(|r| r.id == id))
    }

    /// Insert or replace by id; the saved report moves to the front
    fn save(&self, report: &Report) -> Result<()> {
        let mut reports = self.all()?;
        reports.retain(|r| r.id != report.id);
        reports.insert(0, report.clone());
        self.replace_all(&reports)
    }

    /// Remove by id. Returns whether anything was removed.
    fn delete(&self, id: &str) -> Result<bool> {
        let mut reports = self.all()?;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        if reports.len() == before {
            return Ok(false);
        }
        self.replace_all(&reports)?;
        Ok(true)
    }

    fn clear(&self) -> Result<()>;

    fn replace_all(&self, reports: &[Report]) -> Result<()>;
}

/// File-backed cache
pub struct FileReportCache {
    data_dir: PathBuf,
}

impl FileReportCache {
    /// Cache in the default data directory (`~/.labtally/`)
    pub fn new() -> Result<Self> {
        Ok(Self::with_data_dir(Self::default_data_dir()?))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| LabtallyError::Cache("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".labtally"))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }

    /// Load all reports.
    ///
    /// A missing file is an empty cache. A file that cannot be read yields
    /// an empty list plus `LoadFailed`; a file that is not a JSON array is
    /// removed and yields an empty list plus `Corrupted`. Array entries that
    /// are not reports are skipped with a warning.
    pub fn load(&self) -> (Vec<Report>, Option<CacheWarning>) {
        let path = self.cache_path();
        if !path.exists() {
            return (Vec::new(), None);
        }

        let content = match Self::read_locked(&path) {
            Ok(c) => c,
            Err(e) => {
                return (
                    Vec::new(),
                    Some(CacheWarning::LoadFailed(format!(
                        "Failed to read cache: {}",
                        e
                    ))),
                );
            }
        };

        if content.trim().is_empty() {
            return (Vec::new(), None);
        }

        let entries = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => return Self::clear_corrupted(&path, "not a JSON array".to_string()),
            Err(e) => return Self::clear_corrupted(&path, e.to_string()),
        };

        let total = entries.len();
        let reports: Vec<Report> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable cached report");
                    None
                }
            })
            .collect();

        debug!(
            count = reports.len(),
            skipped = total - reports.len(),
            path = %path.display(),
            "Loaded report cache"
        );
        (reports, None)
    }

    fn clear_corrupted(path: &Path, reason: String) -> (Vec<Report>, Option<CacheWarning>) {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(error = %remove_err, "Failed to remove corrupted cache");
        }
        (
            Vec::new(),
            Some(CacheWarning::Corrupted(format!(
                "Corrupted cache file was cleared: {}",
                reason
            ))),
        )
    }

    /// Read with a shared lock held for the duration of the read
    fn read_locked(path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        let result = std::io::BufReader::new(&file).read_to_string(&mut content);
        let _ = file.unlock();
        result.map(|_| content)
    }

    /// Save using atomic write (temp file + rename) with exclusive lock
    fn write(&self, reports: &[Report]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let content = serde_json::to_string_pretty(reports)
            .map_err(|e| LabtallyError::Cache(format!("Serialization failed: {}", e)))?;

        let path = self.cache_path();
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| LabtallyError::Cache(format!("Failed to create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| LabtallyError::Cache(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| LabtallyError::Cache(format!("Failed to sync temp file: {}", e)))?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| LabtallyError::Cache(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| LabtallyError::Cache(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        debug!(count = reports.len(), "Wrote report cache");
        Ok(())
    }
}

impl ReportRepository for FileReportCache {
    /// An unreadable file is an error so that writes built on this list
    /// never replace it.
    fn all(&self) -> Result<Vec<Report>> {
        match self.load() {
            (_, Some(CacheWarning::LoadFailed(msg))) => Err(LabtallyError::Cache(msg)),
            (reports, Some(warning)) => {
                warn!("{}", warning);
                Ok(reports)
            }
            (reports, None) => Ok(reports),
        }
    }

    fn clear(&self) -> Result<()> {
        let path = self.cache_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn replace_all(&self, reports: &[Report]) -> Result<()> {
        self.write(reports)
    }
}

/// In-memory cache for tests and dry runs
#[derive(Default)]
pub struct MemoryReportCache {
    reports: Mutex<Vec<Report>>,
}

impl MemoryReportCache {
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: Mutex::new(reports),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Report>>> {
        self.reports
            .lock()
            .map_err(|_| LabtallyError::Cache("memory cache lock poisoned".into()))
    }
}

impl ReportRepository for MemoryReportCache {
    fn all(&self) -> Result<Vec<Report>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn replace_all(&self, reports: &[Report]) -> Result<()> {
        *self.lock()? = reports.to_vec();
        Ok(())
    }
}
