//! User configuration (`~/.labtally/config.json`)

use crate::services::cache::FileReportCache;
use crate::services::calendar::HolidayCalendar;
use crate::types::{LabtallyError, Result};
use chrono::NaiveDate;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding `storeUrl`
pub const STORE_URL_ENV: &str = "LABTALLY_STORE_URL";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Report store web app endpoint
    pub store_url: Option<String>,
    /// Local cache directory (defaults to `~/.labtally/`)
    pub data_dir: Option<PathBuf>,
    /// Holidays added to the built-in calendar
    pub extra_holidays: Vec<NaiveDate>,
    /// Company closure days added to the built-in calendar
    pub extra_closures: Vec<NaiveDate>,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| LabtallyError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".labtally").join(CONFIG_FILE))
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;
        config.override_store_url(std::env::var(STORE_URL_ENV).ok());
        Ok(config)
    }

    /// Missing file gives defaults; unreadable or malformed file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| LabtallyError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| LabtallyError::Config(format!("{}: {}", path.display(), e)))
    }

    /// A non-blank override replaces `store_url`
    pub fn override_store_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.store_url = Some(url);
        }
    }

    pub fn calendar(&self) -> HolidayCalendar {
        HolidayCalendar::with_extra(&self.extra_holidays, &self.extra_closures)
    }

    pub fn cache(&self) -> Result<FileReportCache> {
        match &self.data_dir {
            Some(dir) => Ok(FileReportCache::with_data_dir(dir.clone())),
            None => FileReportCache::new(),
        }
    }
}
